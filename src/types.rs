use std::fmt::{Display, Formatter};

use log::error;

use crate::enums::AccessKind;

/// Escapes a name for diagnostic output.
///
/// Works on the UTF-8 bytes: control bytes become `\d` (decimal) or two
/// octal digits, `\t`/`\n`/`\r` keep their letters, and bytes outside
/// printable ASCII become `\xhh`.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            0..=8 => out.push_str(&format!("\\{b}")),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            9..=31 => out.push_str(&format!("\\{b:02o}")),
            127.. => out.push_str(&format!("\\x{b:02x}")),
            _ => out.push(b as char),
        }
    }
    out
}

/// An access-qualified naming scope.
///
/// A namespace with no name is represented with the empty string, which
/// is also how it round-trips on the wire (string index 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub access: AccessKind,
    pub name: String,
}

impl Namespace {
    pub fn new(access: AccessKind, name: impl Into<String>) -> Namespace {
        Namespace {
            access,
            name: name.into(),
        }
    }

    pub fn package(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::Package, name)
    }

    pub fn package_internal(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::PackageInternal, name)
    }

    pub fn protected(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::Protected, name)
    }

    pub fn explicit(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::Explicit, name)
    }

    pub fn static_protected(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::StaticProtected, name)
    }

    pub fn private(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::Private, name)
    }

    /// A namespace of the historical 0x08 ("public"?) kind.
    pub fn undefined(name: impl Into<String>) -> Namespace {
        Namespace::new(AccessKind::Access08, name)
    }

    /// Parses the `"[<label>]<name>"` diagnostic form.
    ///
    /// Input without a bracketed label (or with an unterminated bracket)
    /// is a package namespace over the whole string; an unknown label is
    /// reported and yields `None`.
    pub fn from_label_string(s: &str) -> Option<Namespace> {
        let Some(rest) = s.strip_prefix('[') else {
            return Some(Namespace::package(s));
        };
        let Some((label, name)) = rest.split_once(']') else {
            return Some(Namespace::package(s));
        };
        match AccessKind::from_label(label) {
            Some(access) => Some(Namespace::new(access, name)),
            None => {
                error!("undefined access level: [{label}]");
                None
            }
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]{}", self.access, escape_string(&self.name))
    }
}

/// An ordered collection of namespaces used by unqualified-name lookups.
///
/// Order is preserved on the wire and equality is order-sensitive. An
/// entry is `None` when the wire referenced the reserved namespace index
/// 0; the placeholder keeps the set's length equal to its wire count and
/// writes back as index 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamespaceSet(pub Vec<Option<Namespace>>);

impl NamespaceSet {
    /// A set of present namespaces; placeholder entries only arise from
    /// the wire.
    pub fn new(namespaces: Vec<Namespace>) -> NamespaceSet {
        NamespaceSet(namespaces.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Option<Namespace>> {
        self.0.iter()
    }

    /// The present namespaces, placeholders skipped.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.0.iter().flatten()
    }
}

impl FromIterator<Namespace> for NamespaceSet {
    fn from_iter<I: IntoIterator<Item = Namespace>>(iter: I) -> NamespaceSet {
        NamespaceSet(iter.into_iter().map(Some).collect())
    }
}

impl Display for NamespaceSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, ns) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match ns {
                Some(ns) => write!(f, "{ns}")?,
                None => f.write_str("*")?,
            }
        }
        f.write_str("}")
    }
}

/// A polymorphic name reference.
///
/// The wire kind byte dictates which fields are present, so each kind is
/// its own variant; `None` in a field position corresponds to wire index
/// 0 ("any name" for names, the reserved entry for namespaces and sets).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Multiname {
    /// A name fully qualified by a single namespace.
    QName {
        ns: Option<Namespace>,
        name: Option<String>,
    },
    /// The attribute form of [Multiname::QName].
    QNameA {
        ns: Option<Namespace>,
        name: Option<String>,
    },
    /// A name whose namespace comes from the operand stack at runtime.
    RtQName { name: Option<String> },
    RtQNameA { name: Option<String> },
    /// Namespace and name both come from the operand stack.
    RtQNameL,
    RtQNameLA,
    /// A name resolved against a set of candidate namespaces.
    Multiname {
        name: Option<String>,
        set: Option<NamespaceSet>,
    },
    MultinameA {
        name: Option<String>,
        set: Option<NamespaceSet>,
    },
    /// A runtime name resolved against a set of candidate namespaces.
    MultinameL { set: Option<NamespaceSet> },
    MultinameLA { set: Option<NamespaceSet> },
    /// A kind byte this implementation does not understand, kept so the
    /// rest of the pool can still be inspected.
    Unknown(u8),
}

impl Multiname {
    /// A plain `QName` in the given namespace.
    pub fn qname(ns: Namespace, name: impl Into<String>) -> Multiname {
        Multiname::QName {
            ns: Some(ns),
            name: Some(name.into()),
        }
    }

    /// Parses `"namespace::name"` into a [Multiname::QName].
    ///
    /// The namespace part uses the `"[<label>]<name>"` form of
    /// [Namespace::from_label_string]; without a `"::"` the whole input
    /// is the local name in the unnamed package. A stray single `':'` is
    /// reported but parsing continues with the best-effort split.
    pub fn from_string(s: &str) -> Multiname {
        let (namespace, name) = match s.split_once("::") {
            Some((namespace, name)) => {
                if namespace.contains(':') {
                    error!("single ':' in namespace {namespace:?}");
                }
                if name.contains(':') {
                    error!("single ':' in qualified name {name:?}");
                }
                (namespace, name)
            }
            None => {
                if s.contains(':') {
                    error!("single ':' in name {s:?}");
                }
                ("", s)
            }
        };
        Multiname::QName {
            ns: Namespace::from_label_string(namespace),
            name: Some(name.to_owned()),
        }
    }

    /// The wire kind byte.
    pub fn kind(&self) -> u8 {
        match self {
            Multiname::QName { .. } => 0x07,
            Multiname::QNameA { .. } => 0x0d,
            Multiname::RtQName { .. } => 0x0f,
            Multiname::RtQNameA { .. } => 0x10,
            Multiname::RtQNameL => 0x11,
            Multiname::RtQNameLA => 0x12,
            Multiname::Multiname { .. } => 0x09,
            Multiname::MultinameA { .. } => 0x0e,
            Multiname::MultinameL { .. } => 0x1b,
            Multiname::MultinameLA { .. } => 0x1c,
            Multiname::Unknown(kind) => *kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Multiname::QName { name, .. }
            | Multiname::QNameA { name, .. }
            | Multiname::RtQName { name }
            | Multiname::RtQNameA { name }
            | Multiname::Multiname { name, .. }
            | Multiname::MultinameA { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        match self {
            Multiname::QName { ns, .. } | Multiname::QNameA { ns, .. } => ns.as_ref(),
            _ => None,
        }
    }

    pub fn namespace_set(&self) -> Option<&NamespaceSet> {
        match self {
            Multiname::Multiname { set, .. }
            | Multiname::MultinameA { set, .. }
            | Multiname::MultinameL { set }
            | Multiname::MultinameLA { set } => set.as_ref(),
            _ => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(
            self,
            Multiname::QNameA { .. }
                | Multiname::RtQNameA { .. }
                | Multiname::RtQNameLA
                | Multiname::MultinameA { .. }
                | Multiname::MultinameLA { .. }
        )
    }

    /// True when the namespace is supplied at runtime from the operand
    /// stack rather than stored in the pool.
    pub fn late_namespace(&self) -> bool {
        matches!(
            self,
            Multiname::RtQName { .. }
                | Multiname::RtQNameA { .. }
                | Multiname::RtQNameL
                | Multiname::RtQNameLA
        )
    }

    /// True when the name is supplied at runtime from the operand stack.
    pub fn late_name(&self) -> bool {
        matches!(
            self,
            Multiname::RtQNameL
                | Multiname::RtQNameLA
                | Multiname::MultinameL { .. }
                | Multiname::MultinameLA { .. }
        )
    }
}

fn name_or_any(name: &Option<String>) -> String {
    name.as_deref().map_or_else(|| "*".to_owned(), escape_string)
}

fn part_or_any<T: Display>(part: &Option<T>) -> String {
    part.as_ref().map_or_else(|| "*".to_owned(), |part| part.to_string())
}

impl Display for Multiname {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Multiname::QName { ns, name } => {
                write!(f, "<q>{}::{}", part_or_any(ns), name_or_any(name))
            }
            Multiname::QNameA { ns, name } => {
                write!(f, "<q,attr>{}::{}", part_or_any(ns), name_or_any(name))
            }
            Multiname::RtQName { name } => write!(f, "<rt>{}", name_or_any(name)),
            Multiname::RtQNameA { name } => write!(f, "<rt,attr>{}", name_or_any(name)),
            Multiname::RtQNameL => f.write_str("<rt,l>"),
            Multiname::RtQNameLA => f.write_str("<rt,l,attr>"),
            Multiname::Multiname { name, set } => {
                write!(f, "<multi>{}::{}", part_or_any(set), name_or_any(name))
            }
            Multiname::MultinameA { name, set } => {
                write!(f, "<multi,attr>{}::{}", part_or_any(set), name_or_any(name))
            }
            Multiname::MultinameL { set } => write!(f, "<l,multi>{}", part_or_any(set)),
            Multiname::MultinameLA { set } => write!(f, "<l,multi,attr>{}", part_or_any(set)),
            Multiname::Unknown(kind) => write!(f, "--<MULTINAME {kind:02x}>--"),
        }
    }
}
