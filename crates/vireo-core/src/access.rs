//! Accessor capability flags for the external control protocols.

/// Requested access direction for one external protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Read-only: only getters are generated.
    Get,
    /// Write-only: only setters are generated.
    Set,
    /// Both directions.
    GetSet,
}

impl Access {
    /// Whether this flag enables getters.
    pub fn get(&self) -> bool {
        matches!(self, Self::Get | Self::GetSet)
    }

    /// Whether this flag enables setters.
    pub fn set(&self) -> bool {
        matches!(self, Self::Set | Self::GetSet)
    }
}

/// Independent per-protocol capability flags for one block.
///
/// `None` for a protocol means no accessor of either direction is
/// generated for it, so unintended external mutation is impossible by
/// construction rather than checked at runtime. The two protocols are
/// fully independent of each other and of direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessFlags {
    /// Incremental-mapping layer access.
    pub mapping: Option<Access>,
    /// Network message-routing layer access.
    pub routing: Option<Access>,
}

impl AccessFlags {
    /// No external access at all (the default).
    pub fn none() -> Self {
        Self::default()
    }

    /// Enable mapping-layer access.
    pub fn mapping(mut self, access: Access) -> Self {
        self.mapping = Some(access);
        self
    }

    /// Enable routing-layer access.
    pub fn routing(mut self, access: Access) -> Self {
        self.routing = Some(access);
        self
    }
}
