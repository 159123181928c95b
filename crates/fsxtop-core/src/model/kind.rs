// ── File system variants ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The four FSx file system families.
///
/// String forms match the backend's `FileSystemType` values and parse
/// case-insensitively, so `"ontap"` and `"ONTAP"` are equivalent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    #[strum(serialize = "LUSTRE")]
    Lustre,
    #[strum(serialize = "WINDOWS")]
    Windows,
    #[strum(serialize = "ONTAP")]
    Ontap,
    #[strum(serialize = "OPENZFS")]
    OpenZfs,
}

impl ResourceKind {
    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lustre => "Lustre",
            Self::Windows => "Windows",
            Self::Ontap => "ONTAP",
            Self::OpenZfs => "OpenZFS",
        }
    }

    /// ONTAP and OpenZFS expose nested volumes.
    pub fn has_volumes(self) -> bool {
        matches!(self, Self::Ontap | Self::OpenZfs)
    }

    /// Lustre exposes per-server metadata CPU.
    pub fn has_metadata_servers(self) -> bool {
        matches!(self, Self::Lustre)
    }

    /// Lustre publishes CPU per file server only, so it has to be
    /// discovered and averaged instead of read from the main batch.
    pub fn cpu_needs_discovery(self) -> bool {
        matches!(self, Self::Lustre)
    }
}

/// Storage media backing a file system.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum StorageClass {
    #[default]
    #[strum(serialize = "SSD")]
    Ssd,
    #[strum(serialize = "HDD")]
    Hdd,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn kinds_round_trip_through_backend_strings() {
        for kind in ResourceKind::iter() {
            let parsed: ResourceKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!("openzfs".parse::<ResourceKind>().unwrap(), ResourceKind::OpenZfs);
        assert!("EFS".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn only_lustre_needs_cpu_discovery() {
        let needs: Vec<_> = ResourceKind::iter()
            .filter(|k| k.cpu_needs_discovery())
            .collect();
        assert_eq!(needs, [ResourceKind::Lustre]);
    }

    #[test]
    fn storage_class_parses_backend_values() {
        assert_eq!("HDD".parse::<StorageClass>().unwrap(), StorageClass::Hdd);
        assert_eq!("ssd".parse::<StorageClass>().unwrap(), StorageClass::Ssd);
    }
}
