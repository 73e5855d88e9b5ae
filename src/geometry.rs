//! Cache geometry: the fixed parameters that describe how an address
//! maps onto (tag, index, offset) and how many sets/ways exist.

use crate::error::{LlcError, LlcResult};

/// Decomposed address fields produced by [`CacheGeometry::decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFields {
    pub tag: u32,
    pub index: u32,
    pub offset: u32,
}

/// Immutable description of the cache's shape, derived from capacity,
/// line size and associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    address_bits: u32,
    capacity_bytes: u32,
    line_size: u32,
    associativity: u32,
    num_sets: u32,
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
}

impl CacheGeometry {
    pub const DEFAULT_ADDRESS_BITS: u32 = 32;
    pub const DEFAULT_CAPACITY_BYTES: u32 = 16 * 1024 * 1024;
    pub const DEFAULT_LINE_SIZE: u32 = 64;
    pub const DEFAULT_ASSOCIATIVITY: u32 = 16;
    pub const MAX_ASSOCIATIVITY: u32 = 32;

    /// Build a geometry from capacity (bytes), line size (bytes) and
    /// associativity (ways). Fails with [`LlcError::Configuration`] if
    /// the derived set count is not a power of two, if line size isn't
    /// a power of two, or if associativity falls outside `[1, 32]`.
    pub fn new(capacity_bytes: u32, line_size: u32, associativity: u32) -> LlcResult<Self> {
        Self::with_address_bits(Self::DEFAULT_ADDRESS_BITS, capacity_bytes, line_size, associativity)
    }

    pub fn with_address_bits(
        address_bits: u32,
        capacity_bytes: u32,
        line_size: u32,
        associativity: u32,
    ) -> LlcResult<Self> {
        if associativity == 0 || associativity > Self::MAX_ASSOCIATIVITY {
            return Err(LlcError::Configuration(format!(
                "associativity must be between 1 and {}, got {associativity}",
                Self::MAX_ASSOCIATIVITY
            )));
        }
        if !line_size.is_power_of_two() {
            return Err(LlcError::Configuration(format!(
                "line size must be a power of two, got {line_size}"
            )));
        }
        if !associativity.is_power_of_two() {
            return Err(LlcError::Configuration(format!(
                "associativity must be a power of two, got {associativity}"
            )));
        }
        let set_bytes = line_size
            .checked_mul(associativity)
            .ok_or_else(|| LlcError::Configuration("line size * associativity overflowed".into()))?;
        if set_bytes == 0 || capacity_bytes % set_bytes != 0 {
            return Err(LlcError::Configuration(format!(
                "capacity {capacity_bytes} is not evenly divisible by line_size * associativity ({set_bytes})"
            )));
        }
        let num_sets = capacity_bytes / set_bytes;
        if !num_sets.is_power_of_two() {
            return Err(LlcError::Configuration(format!(
                "derived number of sets ({num_sets}) is not a power of two"
            )));
        }
        let offset_bits = line_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        if offset_bits + index_bits > address_bits {
            return Err(LlcError::Configuration(
                "line size and set count require more bits than the address width".into(),
            ));
        }
        let tag_bits = address_bits - index_bits - offset_bits;

        Ok(Self {
            address_bits,
            capacity_bytes,
            line_size,
            associativity,
            num_sets,
            offset_bits,
            index_bits,
            tag_bits,
        })
    }

    pub fn default_geometry() -> Self {
        Self::new(
            Self::DEFAULT_CAPACITY_BYTES,
            Self::DEFAULT_LINE_SIZE,
            Self::DEFAULT_ASSOCIATIVITY,
        )
        .expect("default geometry parameters are always valid")
    }

    pub fn num_sets(&self) -> u32 {
        self.num_sets
    }

    pub fn associativity(&self) -> u32 {
        self.associativity
    }

    pub fn line_size(&self) -> u32 {
        self.line_size
    }

    pub fn capacity_bytes(&self) -> u32 {
        self.capacity_bytes
    }

    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Split `address` into (tag, index, offset) according to this
    /// geometry. Bits beyond the configured address width are masked
    /// off first.
    pub fn decompose(&self, address: u32) -> AddressFields {
        let address = if self.address_bits >= 32 {
            address
        } else {
            address & ((1u32 << self.address_bits) - 1)
        };
        let offset_mask = (1u32 << self.offset_bits) - 1;
        let index_mask = (1u32 << self.index_bits) - 1;
        let offset = address & offset_mask;
        let index = (address >> self.offset_bits) & index_mask;
        let tag = address >> (self.offset_bits + self.index_bits);
        AddressFields { tag, index, offset }
    }

    /// Render the human-readable configuration block emitted at debug
    /// verbosity on startup.
    pub fn describe(&self) -> String {
        format!(
            "Cache Configuration\n\
             ----------------------------------\n\
             Total Capacity: {:.2} MB\n\
             Line Size: {} bytes\n\
             Associativity: {}-way\n\
             Number of Sets: {}\n\
             Address Bits: tag={} index={} offset={}",
            self.capacity_bytes as f64 / (1024.0 * 1024.0),
            self.line_size,
            self.associativity,
            self.num_sets,
            self.tag_bits,
            self.index_bits,
            self.offset_bits,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_matches_hand_computed_bits() {
        let geo = CacheGeometry::default_geometry();
        assert_eq!(geo.num_sets(), 16384);
        assert_eq!(geo.offset_bits(), 6);
        assert_eq!(geo.index_bits(), 14);
        assert_eq!(geo.tag_bits(), 12);
    }

    #[test]
    fn rejects_non_power_of_two_line_size() {
        let err = CacheGeometry::new(16 * 1024 * 1024, 48, 16).unwrap_err();
        assert!(matches!(err, LlcError::Configuration(_)));
    }

    #[test]
    fn rejects_associativity_out_of_range() {
        assert!(CacheGeometry::new(16 * 1024 * 1024, 64, 64).is_err());
        assert!(CacheGeometry::new(16 * 1024 * 1024, 64, 0).is_err());
    }

    #[test]
    fn decompose_matches_reference_formula() {
        let geo = CacheGeometry::new(16 * 1024 * 1024, 64, 16).unwrap();
        let fields = geo.decompose(0x1000_0002);
        assert_eq!(fields.offset, 0x02);
        assert_eq!(fields.index, (0x1000_0002u32 >> 6) & 0x3FFF);
        assert_eq!(fields.tag, 0x1000_0002u32 >> (6 + 14));
    }
}
