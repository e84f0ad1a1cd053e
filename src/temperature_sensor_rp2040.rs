use embassy_rp::adc::{Adc, Async, Channel, Error};

use crate::thermal::SampleSource;

/// Analog temperature sensor on one of the 12-bit ADC inputs.
pub struct AdcSensor {
    adc: Adc<'static, Async>,
    channel: Channel<'static>,
}

impl AdcSensor {
    pub fn new(adc: Adc<'static, Async>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl SampleSource for AdcSensor {
    type Error = Error;

    async fn read_sample(&mut self) -> Result<u16, Self::Error> {
        self.adc.read(&mut self.channel).await
    }
}
