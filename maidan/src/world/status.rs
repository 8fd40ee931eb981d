//! Per-robot hardware status reported (or modelled) by the radio side.

use crate::config::KickerSection;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Status {
    /// Kicker charge, expressed as achievable kick speed (mm/s)
    pub charge_level: f64,
}

impl Status {
    /// Advance the kicker model by `dt` seconds.
    ///
    /// Kicking discharges fully; charging regenerates up to the maximum.
    pub fn advance(&mut self, dt: f64, is_charging: bool, is_kicking: bool, kicker: &KickerSection) {
        if is_kicking {
            self.charge_level = 0.0;
        } else if is_charging {
            self.charge_level =
                (self.charge_level + kicker.charge_rate * dt.max(0.0)).min(kicker.max_charge_level);
        }
    }

    #[inline]
    pub fn is_charged_to(&self, level: f64) -> bool {
        self.charge_level >= level
    }
}
