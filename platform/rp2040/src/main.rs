#![no_std]
#![no_main]

#[macro_use]
mod resources;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::pwm::Pwm;
use pillow_partner::command_interface::usb_task;
use pillow_partner::heater::heater_task;
use pillow_partner::motor::motor_task;
use pillow_partner::outputs::{motor_bridge, pwm_config, HEATER_PWM_HZ, MOTOR_PWM_HZ};
use pillow_partner::temperature_sensor::AdcSensor;
use pillow_partner::{DEVICE_NAME, VERSION};
use {defmt_rtt as _, panic_probe as _};

use resources::*;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let r = split_resources!(p);
    info!("{} {}", DEVICE_NAME, VERSION);

    let motor_config = pwm_config(MOTOR_PWM_HZ);
    let motor_one = Pwm::new_output_ab(
        r.motors.slice_one,
        r.motors.m1_forward,
        r.motors.m1_reverse,
        motor_config.clone(),
    );
    let motor_two = Pwm::new_output_ab(
        r.motors.slice_two,
        r.motors.m2_forward,
        r.motors.m2_reverse,
        motor_config,
    );
    let bridge = unwrap!(motor_bridge(motor_one, motor_two));

    let heater = Pwm::new_output_a(r.heater.slice, r.heater.pin, pwm_config(HEATER_PWM_HZ));
    let (heater, _) = heater.split();
    let heater = unwrap!(heater);

    let adc = Adc::new(r.sensor.adc, Irqs, adc::Config::default());
    let sensor = AdcSensor::new(adc, Channel::new_pin(r.sensor.pin, Pull::None));

    spawner.spawn(unwrap!(usb_task(spawner, r.usb.usb)));
    spawner.spawn(unwrap!(motor_task(bridge)));
    spawner.spawn(unwrap!(heater_task(sensor, heater)));
}
