use assign_resources::assign_resources;
use embassy_rp::peripherals;
use embassy_rp::Peri;

assign_resources! {
    motors: MotorResources {
        slice_one: PWM_SLICE1,
        m1_forward: PIN_2,
        m1_reverse: PIN_3,
        slice_two: PWM_SLICE2,
        m2_forward: PIN_4,
        m2_reverse: PIN_5,
    },
    heater: HeaterResources {
        slice: PWM_SLICE3,
        pin: PIN_6,
    },
    sensor: SensorResources {
        adc: ADC,
        pin: PIN_26,
    },
    usb: UsbResources {
        usb: USB,
    },
}
