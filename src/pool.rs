use std::io::{self, Read, Write};

use log::{debug, warn};
use thiserror::Error;

use crate::{
    codec::{TagReader, TagWriter},
    enums::AccessKind,
    interner::InternedArray,
    types::{Multiname, Namespace, NamespaceSet},
};

/// Error of [Pool::read] and [Pool::write].
///
/// Only malformed wire data produces these; recoverable oddities (unknown
/// multiname kinds, zero entries inside namespace sets) are reported
/// through `log` and parsing continues.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Failed to decode string entry {index} as UTF-8")]
    BadUtf8 { index: u32 },
    #[error("Unknown namespace access kind 0x{access:02x} at index {index}")]
    BadAccessKind { access: u8, index: u32 },
    #[error("No {kind} entry at index {index}")]
    BadIndex { kind: &'static str, index: u32 },
}

/// The deduplicated literal table at the head of an ABC block.
///
/// Seven kind-keyed interned arrays; index 0 of each is reserved to mean
/// "absent"/"any", so all valid indices are 1-based. Entries going
/// through `register_*` are deduplicated by structural equality; entries
/// read from the wire keep their duplicates so that bytecode referring to
/// specific indices stays valid.
#[derive(Debug, PartialEq)]
pub struct Pool {
    ints: InternedArray<i32>,
    uints: InternedArray<u32>,
    floats: InternedArray<f64>,
    strings: InternedArray<String>,
    namespaces: InternedArray<Namespace>,
    namespace_sets: InternedArray<NamespaceSet>,
    multinames: InternedArray<Multiname>,
}

impl Default for Pool {
    fn default() -> Pool {
        Pool::new()
    }
}

impl Pool {
    pub fn new() -> Pool {
        Pool {
            ints: InternedArray::new(),
            uints: InternedArray::new(),
            floats: InternedArray::new(),
            strings: InternedArray::new(),
            namespaces: InternedArray::new(),
            namespace_sets: InternedArray::new(),
            multinames: InternedArray::new(),
        }
    }

    /// Registers `value`, returning the index of an equal entry if one is
    /// already pooled.
    pub fn register_int(&mut self, value: i32) -> u32 {
        self.ints.append_if_new(value)
    }

    pub fn register_uint(&mut self, value: u32) -> u32 {
        self.uints.append_if_new(value)
    }

    pub fn register_float(&mut self, value: f64) -> u32 {
        self.floats.append_if_new(value)
    }

    pub fn register_string(&mut self, value: &str) -> u32 {
        self.strings.append_if_new(value.to_owned())
    }

    pub fn register_namespace(&mut self, ns: &Namespace) -> u32 {
        self.namespaces.append_if_new(ns.clone())
    }

    pub fn register_namespace_set(&mut self, set: &NamespaceSet) -> u32 {
        self.namespace_sets.append_if_new(set.clone())
    }

    pub fn register_multiname(&mut self, multiname: &Multiname) -> u32 {
        self.multinames.append_if_new(multiname.clone())
    }

    /// Parses `"namespace::name"` and registers the resulting QName.
    pub fn register_multiname_from_string(&mut self, s: &str) -> u32 {
        self.register_multiname(&Multiname::from_string(s))
    }

    /// The index of `value`, or 0 with a diagnostic when it is not pooled.
    pub fn find_int(&self, value: i32) -> u32 {
        let index = self.ints.find(&value);
        if index == 0 {
            warn!("couldn't find int {value} in constant pool");
        }
        index
    }

    pub fn find_uint(&self, value: u32) -> u32 {
        let index = self.uints.find(&value);
        if index == 0 {
            warn!("couldn't find uint {value} in constant pool");
        }
        index
    }

    pub fn find_float(&self, value: f64) -> u32 {
        let index = self.floats.find(&value);
        if index == 0 {
            warn!("couldn't find float {value} in constant pool");
        }
        index
    }

    pub fn find_string(&self, value: &str) -> u32 {
        let index = self.strings.find(&value.to_owned());
        if index == 0 {
            warn!("couldn't find string {value:?} in constant pool");
        }
        index
    }

    pub fn find_namespace(&self, ns: &Namespace) -> u32 {
        let index = self.namespaces.find(ns);
        if index == 0 {
            warn!("couldn't find namespace {ns} in constant pool");
        }
        index
    }

    pub fn find_namespace_set(&self, set: &NamespaceSet) -> u32 {
        let index = self.namespace_sets.find(set);
        if index == 0 {
            warn!("couldn't find namespace set {set} in constant pool");
        }
        index
    }

    pub fn find_multiname(&self, multiname: &Multiname) -> u32 {
        let index = self.multinames.find(multiname);
        if index == 0 {
            warn!("couldn't find multiname {multiname} in constant pool");
        }
        index
    }

    /// The int at `index`; the reserved index 0 reads as 0.
    pub fn lookup_int(&self, index: u32) -> i32 {
        self.ints.get(index).copied().unwrap_or(0)
    }

    /// The uint at `index`; the reserved index 0 reads as 0.
    pub fn lookup_uint(&self, index: u32) -> u32 {
        self.uints.get(index).copied().unwrap_or(0)
    }

    /// The double at `index`; the reserved index 0 reads as NaN.
    pub fn lookup_float(&self, index: u32) -> f64 {
        self.floats.get(index).copied().unwrap_or(f64::NAN)
    }

    pub fn lookup_string(&self, index: u32) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn lookup_namespace(&self, index: u32) -> Option<&Namespace> {
        self.namespaces.get(index)
    }

    pub fn lookup_namespace_set(&self, index: u32) -> Option<&NamespaceSet> {
        self.namespace_sets.get(index)
    }

    pub fn lookup_multiname(&self, index: u32) -> Option<&Multiname> {
        self.multinames.get(index)
    }

    /// Parses a constant pool from `tag`.
    ///
    /// Entries are appended verbatim, duplicates included, so the index
    /// assignments of the stream are preserved. On error the pool is left
    /// partially filled and must be discarded.
    pub fn read<R: Read>(&mut self, tag: &mut TagReader<R>) -> Result<(), PoolError> {
        let num_ints = tag.read_u30()?;
        for _ in 1..num_ints {
            let value = tag.read_s30()?;
            self.ints.append(value);
        }

        let num_uints = tag.read_u30()?;
        for _ in 1..num_uints {
            let value = tag.read_u30()?;
            self.uints.append(value);
        }

        let num_floats = tag.read_u30()?;
        for _ in 1..num_floats {
            let value = tag.read_d64()?;
            self.floats.append(value);
        }

        let num_strings = tag.read_u30()?;
        for index in 1..num_strings {
            let len = tag.read_u30()?;
            let bytes = tag.read_block(len as usize)?;
            let value = String::from_utf8(bytes).map_err(|_| PoolError::BadUtf8 { index })?;
            self.strings.append(value);
        }

        let num_namespaces = tag.read_u30()?;
        for index in 1..num_namespaces {
            let access = tag.read_u8()?;
            let access =
                AccessKind::from(access).ok_or(PoolError::BadAccessKind { access, index })?;
            let name_index = tag.read_u30()?;
            // a string index of zero denotes the empty string
            let name = match name_index {
                0 => String::new(),
                index => self.string_at(index)?.to_owned(),
            };
            self.namespaces.append(Namespace { access, name });
        }

        let num_sets = tag.read_u30()?;
        for index in 1..num_sets {
            let count = tag.read_u30()?;
            let mut namespaces = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let ns_index = tag.read_u30()?;
                if ns_index == 0 {
                    // kept as a placeholder so the set's length still
                    // matches its wire count
                    warn!("zero entry in namespace set {index}");
                    namespaces.push(None);
                    continue;
                }
                namespaces.push(Some(self.namespace_at(ns_index)?.clone()));
            }
            self.namespace_sets.append(NamespaceSet(namespaces));
        }

        let num_multinames = tag.read_u30()?;
        for _ in 1..num_multinames {
            let kind = tag.read_u8()?;
            let multiname = match kind {
                0x07 | 0x0d => {
                    let ns = self.namespace_ref(tag.read_u30()?)?;
                    let name = self.name_ref(tag.read_u30()?)?;
                    if kind == 0x07 {
                        Multiname::QName { ns, name }
                    } else {
                        Multiname::QNameA { ns, name }
                    }
                }
                0x0f | 0x10 => {
                    let name = self.name_ref(tag.read_u30()?)?;
                    if kind == 0x0f {
                        Multiname::RtQName { name }
                    } else {
                        Multiname::RtQNameA { name }
                    }
                }
                0x11 => Multiname::RtQNameL,
                0x12 => Multiname::RtQNameLA,
                0x09 | 0x0e => {
                    let name = self.name_ref(tag.read_u30()?)?;
                    let set = self.namespace_set_ref(tag.read_u30()?)?;
                    if kind == 0x09 {
                        Multiname::Multiname { name, set }
                    } else {
                        Multiname::MultinameA { name, set }
                    }
                }
                0x1b | 0x1c => {
                    let set = self.namespace_set_ref(tag.read_u30()?)?;
                    if kind == 0x1b {
                        Multiname::MultinameL { set }
                    } else {
                        Multiname::MultinameLA { set }
                    }
                }
                kind => {
                    warn!("can't parse kind 0x{kind:02x} multinames yet");
                    Multiname::Unknown(kind)
                }
            };
            self.multinames.append(multiname);
        }

        debug!(
            "read constant pool: {num_ints} ints, {num_uints} uints, {num_floats} floats, \
             {num_strings} strings, {num_namespaces} namespaces, {num_sets} namespace sets, \
             {num_multinames} multinames"
        );
        Ok(())
    }

    /// Serializes the pool to `tag`.
    ///
    /// First closes transitive references (the namespaces, sets and name
    /// strings used by multinames, the namespaces used by sets, the name
    /// strings used by namespaces) so that every index emitted afterwards
    /// resolves.
    ///
    /// # Panics
    ///
    /// Panics when an entry the closure phase should have registered is
    /// missing at emit time; that is a bug, not a data error.
    pub fn write<W: Write>(&mut self, tag: &mut TagWriter<W>) -> Result<(), PoolError> {
        for index in 1..self.multinames.len() {
            let Some(multiname) = self.multinames.get(index).cloned() else {
                continue;
            };
            if let Some(ns) = multiname.namespace() {
                self.register_namespace(ns);
            }
            if let Some(set) = multiname.namespace_set() {
                self.register_namespace_set(set);
            }
            if let Some(name) = multiname.name() {
                self.register_string(name);
            }
        }
        for index in 1..self.namespace_sets.len() {
            let Some(set) = self.namespace_sets.get(index).cloned() else {
                continue;
            };
            for ns in set.namespaces() {
                self.register_namespace(ns);
            }
        }
        for index in 1..self.namespaces.len() {
            let Some(ns) = self.namespaces.get(index).cloned() else {
                continue;
            };
            if !ns.name.is_empty() {
                self.register_string(&ns.name);
            }
        }

        tag.write_u30(wire_count(self.ints.len()))?;
        for &value in self.ints.iter() {
            tag.write_s30(value)?;
        }
        tag.write_u30(wire_count(self.uints.len()))?;
        for &value in self.uints.iter() {
            tag.write_u30(value)?;
        }
        tag.write_u30(wire_count(self.floats.len()))?;
        for &value in self.floats.iter() {
            tag.write_d64(value)?;
        }
        tag.write_u30(wire_count(self.strings.len()))?;
        for value in self.strings.iter() {
            tag.write_u30_string(value)?;
        }
        tag.write_u30(wire_count(self.namespaces.len()))?;
        for ns in self.namespaces.iter() {
            tag.write_u8(ns.access as u8)?;
            if ns.name.is_empty() {
                tag.write_u30(0)?;
            } else {
                tag.write_u30(self.expect_string(&ns.name))?;
            }
        }
        tag.write_u30(wire_count(self.namespace_sets.len()))?;
        for set in self.namespace_sets.iter() {
            tag.write_u30(set.len() as u32)?;
            for ns in set.iter() {
                tag.write_u30(ns.as_ref().map_or(0, |ns| self.expect_namespace(ns)))?;
            }
        }
        tag.write_u30(wire_count(self.multinames.len()))?;
        for multiname in self.multinames.iter() {
            tag.write_u8(multiname.kind())?;
            match multiname {
                Multiname::QName { ns, name } | Multiname::QNameA { ns, name } => {
                    tag.write_u30(ns.as_ref().map_or(0, |ns| self.expect_namespace(ns)))?;
                    tag.write_u30(name.as_deref().map_or(0, |name| self.expect_string(name)))?;
                }
                Multiname::RtQName { name } | Multiname::RtQNameA { name } => {
                    tag.write_u30(name.as_deref().map_or(0, |name| self.expect_string(name)))?;
                }
                Multiname::RtQNameL | Multiname::RtQNameLA => {}
                Multiname::Multiname { name, set } | Multiname::MultinameA { name, set } => {
                    tag.write_u30(name.as_deref().map_or(0, |name| self.expect_string(name)))?;
                    tag.write_u30(set.as_ref().map_or(0, |set| self.expect_namespace_set(set)))?;
                }
                Multiname::MultinameL { set } | Multiname::MultinameLA { set } => {
                    tag.write_u30(set.as_ref().map_or(0, |set| self.expect_namespace_set(set)))?;
                }
                Multiname::Unknown(_) => {}
            }
        }
        Ok(())
    }

    fn string_at(&self, index: u32) -> Result<&str, PoolError> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(PoolError::BadIndex { kind: "string", index })
    }

    fn namespace_at(&self, index: u32) -> Result<&Namespace, PoolError> {
        self.namespaces.get(index).ok_or(PoolError::BadIndex {
            kind: "namespace",
            index,
        })
    }

    // wire index 0 means "any name"
    fn name_ref(&self, index: u32) -> Result<Option<String>, PoolError> {
        match index {
            0 => Ok(None),
            index => Ok(Some(self.string_at(index)?.to_owned())),
        }
    }

    fn namespace_ref(&self, index: u32) -> Result<Option<Namespace>, PoolError> {
        match index {
            0 => Ok(None),
            index => Ok(Some(self.namespace_at(index)?.clone())),
        }
    }

    fn namespace_set_ref(&self, index: u32) -> Result<Option<NamespaceSet>, PoolError> {
        match index {
            0 => Ok(None),
            index => {
                let set = self.namespace_sets.get(index).ok_or(PoolError::BadIndex {
                    kind: "namespace set",
                    index,
                })?;
                Ok(Some(set.clone()))
            }
        }
    }

    fn expect_string(&self, value: &str) -> u32 {
        match self.find_string(value) {
            0 => panic!("internal error: unregistered string {value:?}"),
            index => index,
        }
    }

    fn expect_namespace(&self, ns: &Namespace) -> u32 {
        match self.find_namespace(ns) {
            0 => panic!("internal error: unregistered namespace {ns}"),
            index => index,
        }
    }

    fn expect_namespace_set(&self, set: &NamespaceSet) -> u32 {
        match self.find_namespace_set(set) {
            0 => panic!("internal error: unregistered namespace set {set}"),
            index => index,
        }
    }
}

// a pool section holding only the reserved entry is written as count 0
fn wire_count(len: u32) -> u32 {
    if len > 1 {
        len
    } else {
        0
    }
}
