//! Element-count policy for range-based fills.

/// Controls whether an element-count mismatch during a range fill is an
/// error or a tolerated condition.
///
/// Two independent flags yield four states. With [`FillPolicy::STRICT`]
/// (the default) both mismatches fail; [`FillPolicy::PAD_MISSING`]
/// default-fills slots the input did not cover; [`FillPolicy::IGNORE_SURPLUS`]
/// leaves extra input unread; [`FillPolicy::LENIENT`] does both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillPolicy {
    /// Default-fill slots left over when the input is short.
    pub pad_missing: bool,
    /// Tolerate input longer than the slot count, leaving the rest unread.
    pub ignore_surplus: bool,
}

impl FillPolicy {
    /// Fail on both "too few" and "too many".
    pub const STRICT: Self = Self {
        pad_missing: false,
        ignore_surplus: false,
    };

    /// Tolerate a short input by default-filling the remaining slots.
    pub const PAD_MISSING: Self = Self {
        pad_missing: true,
        ignore_surplus: false,
    };

    /// Tolerate a long input by stopping at capacity.
    pub const IGNORE_SURPLUS: Self = Self {
        pad_missing: false,
        ignore_surplus: true,
    };

    /// Tolerate both mismatches.
    pub const LENIENT: Self = Self {
        pad_missing: true,
        ignore_surplus: true,
    };

    /// Whether a short input is tolerated.
    pub fn allows_fewer(self) -> bool {
        self.pad_missing
    }

    /// Whether a long input is tolerated.
    pub fn allows_more(self) -> bool {
        self.ignore_surplus
    }
}
