//! Names of the columns appended to the combined table.

use crate::channel::Channel;

pub const SAMPLE_CATEGORY: &str = "Sample Category";
pub const OVERALL_RESULT: &str = "Overall Result";
pub const INSTRUMENT_SERIAL: &str = "Instrument Serial";
pub const SOFTWARE_VERSION: &str = "Software Version";

/// Stage 2 column, e.g. `FAM Truth`.
pub fn truth_column(channel: Channel) -> String {
    format!("{channel} Truth")
}

/// Stage 3 column, e.g. `FAM Validity`.
pub fn validity_column(channel: Channel) -> String {
    format!("{channel} Validity")
}

/// Stage 4 column, e.g. `PQ-FAM-RFU`.
pub fn pq_column(channel: Channel) -> String {
    format!("PQ-{channel}-RFU")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names() {
        assert_eq!(truth_column(Channel::Hex), "HEX Truth");
        assert_eq!(validity_column(Channel::Red647), "RED647 Validity");
        assert_eq!(pq_column(Channel::Ic), "PQ-IC-RFU");
    }
}
