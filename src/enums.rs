use std::fmt::{Display, Formatter};

/// The access byte of a namespace, classifying its visibility.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Private = 0x05,
    /// The historical "public/undefined" kind; old compilers do emit it.
    Access08 = 0x08,
    Package = 0x16,
    PackageInternal = 0x17,
    Protected = 0x18,
    Explicit = 0x19,
    StaticProtected = 0x1a,
}

impl AccessKind {
    pub fn from(n: u8) -> Option<Self> {
        match n {
            0x05 => Some(AccessKind::Private),
            0x08 => Some(AccessKind::Access08),
            0x16 => Some(AccessKind::Package),
            0x17 => Some(AccessKind::PackageInternal),
            0x18 => Some(AccessKind::Protected),
            0x19 => Some(AccessKind::Explicit),
            0x1a => Some(AccessKind::StaticProtected),
            _ => None,
        }
    }

    /// The textual label used by the diagnostic string forms.
    pub fn label(self) -> &'static str {
        match self {
            AccessKind::Private => "private",
            AccessKind::Access08 => "access08",
            AccessKind::Package => "package",
            AccessKind::PackageInternal => "packageinternal",
            AccessKind::Protected => "protected",
            AccessKind::Explicit => "explicit",
            AccessKind::StaticProtected => "staticprotected",
        }
    }

    /// Parses a label as it appears between brackets in a namespace
    /// string. The empty label means package; "undefined" is the spelling
    /// some toolchains use for the 0x08 kind.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "" | "package" => Some(AccessKind::Package),
            "undefined" | "access08" => Some(AccessKind::Access08),
            "packageinternal" => Some(AccessKind::PackageInternal),
            "protected" => Some(AccessKind::Protected),
            "explicit" => Some(AccessKind::Explicit),
            "staticprotected" => Some(AccessKind::StaticProtected),
            "private" => Some(AccessKind::Private),
            _ => None,
        }
    }
}

impl Display for AccessKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
