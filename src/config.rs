use crate::frame::BROADCAST_ADDRESS;

/// Driver settings. `Config::default()` matches the module's factory setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Device address written into every frame.
    pub address: u32,
    /// Reply timeout for single-step commands, in milliseconds.
    pub short_timeout_ms: u32,
    /// Reply timeout for `PS_AutoEnroll`, in milliseconds.
    pub long_timeout_ms: u32,
    /// Pause before reading each reply byte, in milliseconds.
    pub inter_byte_ms: u32,
    /// Pause between the enrollment start indicator and `PS_AutoEnroll`.
    pub settle_delay_ms: u32,
    /// Feature buffer used by identification.
    pub feature_buffer: u8,
    /// First slot ID searched by identification.
    pub search_start: u16,
    /// Last slot ID searched by identification.
    pub search_end: u16,
    /// Show [`Pattern::NO_FINGER`](crate::Pattern::NO_FINGER) when
    /// identification finds no finger on the sensor.
    pub no_finger_indicator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: BROADCAST_ADDRESS,
            short_timeout_ms: 2_000,
            long_timeout_ms: 10_000,
            inter_byte_ms: 2,
            settle_delay_ms: 500,
            feature_buffer: 1,
            search_start: 0x0000,
            search_end: 0xFFFF,
            no_finger_indicator: false,
        }
    }
}

impl Config {
    pub fn with_address(mut self, address: u32) -> Self {
        self.address = address;
        self
    }

    pub fn with_timeouts(mut self, short_ms: u32, long_ms: u32) -> Self {
        self.short_timeout_ms = short_ms;
        self.long_timeout_ms = long_ms;
        self
    }

    pub fn with_inter_byte_ms(mut self, ms: u32) -> Self {
        self.inter_byte_ms = ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Feature buffer for identification, 1 or 2.
    pub fn with_feature_buffer(mut self, buffer: u8) -> Self {
        self.feature_buffer = buffer;
        self
    }

    pub fn with_search_range(mut self, start: u16, end: u16) -> Self {
        self.search_start = start;
        self.search_end = end;
        self
    }

    pub fn with_no_finger_indicator(mut self, enabled: bool) -> Self {
        self.no_finger_indicator = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_every_field() {
        let config = Config::default()
            .with_address(0x1234_5678)
            .with_timeouts(500, 4_000)
            .with_inter_byte_ms(0)
            .with_settle_delay_ms(250)
            .with_feature_buffer(2)
            .with_search_range(10, 20)
            .with_no_finger_indicator(true);

        assert_eq!(
            config,
            Config {
                address: 0x1234_5678,
                short_timeout_ms: 500,
                long_timeout_ms: 4_000,
                inter_byte_ms: 0,
                settle_delay_ms: 250,
                feature_buffer: 2,
                search_start: 10,
                search_end: 20,
                no_finger_indicator: true,
            }
        );
    }
}
