/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Address family preference, deciding which record types get queried and
/// in what priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4Only,
    #[default]
    Ipv4First,
    Ipv6First,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    pub fn get_type(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl AddressFamily {
    /// The ordered, deduplicated record type list for this preference.
    pub fn record_types(&self) -> &'static [RecordType] {
        match self {
            AddressFamily::Ipv4Only => &[RecordType::A],
            AddressFamily::Ipv4First => &[RecordType::A, RecordType::Aaaa],
            AddressFamily::Ipv6First => &[RecordType::Aaaa, RecordType::A],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_order() {
        assert_eq!(AddressFamily::Ipv4Only.record_types(), &[RecordType::A]);
        assert_eq!(
            AddressFamily::Ipv4First.record_types(),
            &[RecordType::A, RecordType::Aaaa]
        );
        assert_eq!(
            AddressFamily::Ipv6First.record_types(),
            &[RecordType::Aaaa, RecordType::A]
        );
    }
}
