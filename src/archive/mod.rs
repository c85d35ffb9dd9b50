//! Node-de-duplicating binary archive.
//!
//! An archive holds three tables:
//! - *atoms*: interned strings (property names, symbol names, numeric
//!   literals), each stored once;
//! - *expressions*: named roots, `(name-atom, node-id)` pairs;
//! - *nodes*: one property list per archived node.
//!
//! A property is a `(name-atom, type, value)` triple with the type tag in
//! the low 3 bits of the leading varint. Node-valued properties refer to
//! node-table indices, so shared subtrees stay shared on disk.
//!
//! Wire encoding: magic `G A R C`, a varint version, then the three tables.
//! Unsigned integers use the 7-bit-per-byte little-endian variable-length
//! form (values below `0x80` encode themselves; larger values write the low
//! seven bits with the high bit set and recurse on the rest). Strings are
//! zero-terminated. The reader accepts versions in
//! `[ARCHIVE_VERSION - ARCHIVE_AGE, ARCHIVE_VERSION]`.
//!
//! While archiving, nodes are de-duplicated by canonical node pointer
//! identity; unarchiving runs everything back through the canonicalizing
//! constructors, and symbols found in the caller-supplied symbol table keep
//! their identity (which is what makes a second write pass byte-identical).

use std::io::{self, Read, Write};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::algebra::pairseq::{self, Pair};
use crate::algebra::{Series, ncmul_many, try_power};
use crate::core::constant::builtin_constant;
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind, RelOp};
use crate::core::numeric::Numeric;
use crate::core::symbol::Symbol;
use crate::functions::registry;
use crate::matrix::Matrix;

/// Current archive format version.
pub const ARCHIVE_VERSION: u64 = 3;
/// How many prior versions the reader still accepts.
pub const ARCHIVE_AGE: u64 = 1;

const MAGIC: [u8; 4] = [0x47, 0x41, 0x52, 0x43];

const TYPE_BOOL: u64 = 0;
const TYPE_UNSIGNED: u64 = 1;
const TYPE_STRING: u64 = 2;
const TYPE_NODE: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PropValue {
    Bool(bool),
    Unsigned(u64),
    Str(u32),
    Node(u32),
}

#[derive(Debug, Clone)]
struct Prop {
    name: u32,
    value: PropValue,
}

#[derive(Debug, Clone)]
struct ArchNode {
    class: u32,
    props: Vec<Prop>,
}

/// A binary archive of named expression trees.
#[derive(Debug, Default)]
pub struct Archive {
    atoms: Vec<String>,
    atom_ids: FxHashMap<String, u32>,
    exprs: Vec<(u32, u32)>,
    nodes: Vec<ArchNode>,
    node_ids: FxHashMap<usize, u32>,
}

// Signed values (series orders, Laurent degrees) ride the unsigned varint
// through zigzag folding.
fn zigzag(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

impl Archive {
    /// An empty archive.
    pub fn new() -> Self {
        Archive::default()
    }

    /// Number of archived expressions.
    pub fn count(&self) -> usize {
        self.exprs.len()
    }

    fn atom(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.atom_ids.get(s) {
            return id;
        }
        let id = self.atoms.len() as u32;
        self.atoms.push(s.to_string());
        self.atom_ids.insert(s.to_string(), id);
        id
    }

    fn atom_str(&self, id: u32) -> Result<&str, KernelError> {
        self.atoms
            .get(id as usize)
            .map(String::as_str)
            .ok_or_else(|| KernelError::range(format!("atom id {id} out of range")))
    }

    // ---------------------------------------------------------------------
    // Archiving
    // ---------------------------------------------------------------------

    /// Archive an expression under a name.
    pub fn archive_ex(&mut self, name: &str, e: &Ex) {
        let root = self.node_id(e);
        let name_atom = self.atom(name);
        self.exprs.push((name_atom, root));
    }

    // De-duplicate by canonical node pointer; children are archived before
    // their parents, so node properties always refer backwards.
    fn node_id(&mut self, e: &Ex) -> u32 {
        let key = Arc::as_ptr(e.node_arc()) as usize;
        if let Some(&id) = self.node_ids.get(&key) {
            return id;
        }
        let node = self.make_node(e);
        let id = self.nodes.len() as u32;
        self.nodes.push(node);
        self.node_ids.insert(key, id);
        id
    }

    fn numeric_node_id(&mut self, n: &Numeric) -> u32 {
        self.node_id(&Ex::numeric(n.clone()))
    }

    fn real_prop(&mut self, name: &str, n: &Numeric) -> Prop {
        let text = n.to_string();
        Prop {
            name: self.atom(name),
            value: PropValue::Str(self.atom(&text)),
        }
    }

    fn node_prop(&mut self, name: &str, e: &Ex) -> Prop {
        let id = self.node_id(e);
        Prop {
            name: self.atom(name),
            value: PropValue::Node(id),
        }
    }

    fn unsigned_prop(&mut self, name: &str, v: u64) -> Prop {
        Prop {
            name: self.atom(name),
            value: PropValue::Unsigned(v),
        }
    }

    fn pairseq_props(&mut self, seq: &crate::algebra::PairSeq) -> Vec<Prop> {
        let mut props = Vec::with_capacity(2 * seq.pairs.len() + 1);
        let overall = self.numeric_node_id(&seq.overall);
        props.push(Prop {
            name: self.atom("overall"),
            value: PropValue::Node(overall),
        });
        for p in &seq.pairs {
            props.push(self.node_prop("rest", &p.rest));
            let coeff = self.numeric_node_id(&p.coeff);
            props.push(Prop {
                name: self.atom("coeff"),
                value: PropValue::Node(coeff),
            });
        }
        props
    }

    fn make_node(&mut self, e: &Ex) -> ArchNode {
        match &**e {
            NodeKind::Num(n) => {
                let props = match n {
                    Numeric::Cplx { re, im } => {
                        vec![self.real_prop("re", re), self.real_prop("im", im)]
                    }
                    other => vec![self.real_prop("value", other)],
                };
                ArchNode {
                    class: self.atom("numeric"),
                    props,
                }
            }
            NodeKind::Sym(s) => {
                let props = vec![
                    Prop {
                        name: self.atom("name"),
                        value: PropValue::Str(self.atom(s.name())),
                    },
                    self.unsigned_prop("serial", s.serial()),
                ];
                ArchNode {
                    class: self.atom("symbol"),
                    props,
                }
            }
            NodeKind::Const(c) => {
                let props = vec![Prop {
                    name: self.atom("name"),
                    value: PropValue::Str(self.atom(c.name())),
                }];
                ArchNode {
                    class: self.atom("constant"),
                    props,
                }
            }
            NodeKind::Add(seq) => ArchNode {
                class: self.atom("add"),
                props: self.pairseq_props(seq),
            },
            NodeKind::Mul(seq) => ArchNode {
                class: self.atom("mul"),
                props: self.pairseq_props(seq),
            },
            NodeKind::NcMul(items) => {
                let props = items.iter().map(|f| self.node_prop("factor", f)).collect();
                ArchNode {
                    class: self.atom("ncmul"),
                    props,
                }
            }
            NodeKind::Pow { base, expo } => {
                let props = vec![self.node_prop("base", base), self.node_prop("expo", expo)];
                ArchNode {
                    class: self.atom("power"),
                    props,
                }
            }
            NodeKind::Func { serial, args } => {
                let fname = registry::name_of(*serial).unwrap_or_default();
                let mut props = vec![Prop {
                    name: self.atom("name"),
                    value: PropValue::Str(self.atom(&fname)),
                }];
                props.extend(args.iter().map(|a| self.node_prop("arg", a)));
                ArchNode {
                    class: self.atom("function"),
                    props,
                }
            }
            NodeKind::List(items) => {
                let props = items.iter().map(|i| self.node_prop("item", i)).collect();
                ArchNode {
                    class: self.atom("list"),
                    props,
                }
            }
            NodeKind::Tuple(items) => {
                let props = items.iter().map(|i| self.node_prop("item", i)).collect();
                ArchNode {
                    class: self.atom("tuple"),
                    props,
                }
            }
            NodeKind::Matrix(m) => {
                let mut props = vec![
                    self.unsigned_prop("rows", m.rows() as u64),
                    self.unsigned_prop("cols", m.cols() as u64),
                ];
                props.extend(m.elems().iter().map(|el| self.node_prop("elem", el)));
                ArchNode {
                    class: self.atom("matrix"),
                    props,
                }
            }
            NodeKind::Rel { lhs, rhs, op } => {
                let rank = match op {
                    RelOp::Equal => 0u64,
                    RelOp::NotEqual => 1,
                    RelOp::Less => 2,
                    RelOp::LessEq => 3,
                    RelOp::Greater => 4,
                    RelOp::GreaterEq => 5,
                };
                let props = vec![
                    self.unsigned_prop("op", rank),
                    self.node_prop("lhs", lhs),
                    self.node_prop("rhs", rhs),
                ];
                ArchNode {
                    class: self.atom("relational"),
                    props,
                }
            }
            NodeKind::Series(s) => {
                let mut props = vec![
                    self.node_prop("var", &s.var),
                    self.node_prop("point", &s.point),
                    self.unsigned_prop("order", zigzag(s.order)),
                ];
                for (c, d) in &s.terms {
                    props.push(self.node_prop("coeff", c));
                    props.push(self.unsigned_prop("degree", zigzag(*d)));
                }
                ArchNode {
                    class: self.atom("series"),
                    props,
                }
            }
            NodeKind::Fail => ArchNode {
                class: self.atom("fail"),
                props: Vec::new(),
            },
        }
    }

    // ---------------------------------------------------------------------
    // Unarchiving
    // ---------------------------------------------------------------------

    /// Reconstruct the expression archived under `name`. Symbols whose name
    /// appears in `symtab` are mapped to the supplied symbols; everything
    /// else gets fresh identities.
    ///
    /// # Errors
    /// `Range` for an unknown name or a bad id, `Runtime` for unknown
    /// classes or malformed node contents.
    pub fn unarchive_ex(&self, name: &str, symtab: &[Ex]) -> Result<Ex, KernelError> {
        let name_atom = self
            .atom_ids
            .get(name)
            .ok_or_else(|| KernelError::range(format!("no archived expression '{name}'")))?;
        let root = self
            .exprs
            .iter()
            .find(|(n, _)| n == name_atom)
            .map(|(_, id)| *id)
            .ok_or_else(|| KernelError::range(format!("no archived expression '{name}'")))?;
        let mut ctx = UnarchiveCtx {
            archive: self,
            symtab,
            cache: vec![None; self.nodes.len()],
            serial_map: FxHashMap::default(),
        };
        ctx.build(root, u32::MAX)
    }
}

struct UnarchiveCtx<'a> {
    archive: &'a Archive,
    symtab: &'a [Ex],
    cache: Vec<Option<Ex>>,
    serial_map: FxHashMap<u64, Ex>,
}

impl UnarchiveCtx<'_> {
    fn build(&mut self, id: u32, parent: u32) -> Result<Ex, KernelError> {
        // Writers emit children before parents; anything else is a forgery.
        if id >= parent {
            return Err(KernelError::runtime("cyclic node reference in archive"));
        }
        if let Some(Some(cached)) = self.cache.get(id as usize) {
            return Ok(cached.clone());
        }
        let node = self
            .archive
            .nodes
            .get(id as usize)
            .ok_or_else(|| KernelError::range(format!("node id {id} out of range")))?;
        let class = self.archive.atom_str(node.class)?.to_string();
        let built = self.build_class(&class, node, id)?;
        self.cache[id as usize] = Some(built.clone());
        Ok(built)
    }

    fn prop_str(&self, node: &ArchNode, name: &str) -> Result<String, KernelError> {
        for p in &node.props {
            if self.archive.atom_str(p.name)? == name {
                if let PropValue::Str(atom) = p.value {
                    return Ok(self.archive.atom_str(atom)?.to_string());
                }
            }
        }
        Err(KernelError::runtime(format!(
            "archive node is missing string property '{name}'"
        )))
    }

    fn prop_unsigned(&self, node: &ArchNode, name: &str) -> Result<u64, KernelError> {
        for p in &node.props {
            if self.archive.atom_str(p.name)? == name {
                if let PropValue::Unsigned(v) = p.value {
                    return Ok(v);
                }
            }
        }
        Err(KernelError::runtime(format!(
            "archive node is missing unsigned property '{name}'"
        )))
    }

    fn prop_node(&mut self, node: &ArchNode, name: &str, id: u32) -> Result<Ex, KernelError> {
        for p in &node.props {
            if self.archive.atom_str(p.name)? == name {
                if let PropValue::Node(child) = p.value {
                    return self.build(child, id);
                }
            }
        }
        Err(KernelError::runtime(format!(
            "archive node is missing node property '{name}'"
        )))
    }

    fn prop_nodes(&mut self, node: &ArchNode, name: &str, id: u32) -> Result<Vec<Ex>, KernelError> {
        let mut out = Vec::new();
        for p in &node.props {
            if self.archive.atom_str(p.name)? == name {
                if let PropValue::Node(child) = p.value {
                    out.push(self.build(child, id)?);
                }
            }
        }
        Ok(out)
    }

    fn numeric_of(&mut self, e: &Ex) -> Result<Numeric, KernelError> {
        e.as_numeric()
            .cloned()
            .ok_or_else(|| KernelError::runtime("archive coefficient is not numeric"))
    }

    fn build_pairseq(
        &mut self,
        node: &ArchNode,
        id: u32,
    ) -> Result<(Vec<Pair>, Numeric), KernelError> {
        let overall = {
            let e = self.prop_node(node, "overall", id)?;
            self.numeric_of(&e)?
        };
        let rests = self.prop_nodes(node, "rest", id)?;
        let coeffs = self.prop_nodes(node, "coeff", id)?;
        if rests.len() != coeffs.len() {
            return Err(KernelError::runtime("unbalanced pair properties in archive"));
        }
        let mut pairs = Vec::with_capacity(rests.len());
        for (rest, coeff) in rests.into_iter().zip(coeffs) {
            let coeff = self.numeric_of(&coeff)?;
            pairs.push(Pair { rest, coeff });
        }
        Ok((pairs, overall))
    }

    fn build_class(&mut self, class: &str, node: &ArchNode, id: u32) -> Result<Ex, KernelError> {
        match class {
            "numeric" => {
                if node.props.len() == 2 {
                    let re = Numeric::parse_real(&self.prop_str(node, "re")?)?;
                    let im = Numeric::parse_real(&self.prop_str(node, "im")?)?;
                    Ok(Ex::numeric(Numeric::complex(re, im)))
                } else {
                    Ok(Ex::numeric(Numeric::parse_real(
                        &self.prop_str(node, "value")?,
                    )?))
                }
            }
            "symbol" => {
                let name = self.prop_str(node, "name")?;
                let serial = self.prop_unsigned(node, "serial")?;
                if let Some(existing) = self.serial_map.get(&serial) {
                    return Ok(existing.clone());
                }
                let sym = self
                    .symtab
                    .iter()
                    .find(|s| s.as_symbol().is_some_and(|sy| sy.name() == name))
                    .cloned()
                    .unwrap_or_else(|| Ex::from_symbol(Symbol::new(&name)));
                self.serial_map.insert(serial, sym.clone());
                Ok(sym)
            }
            "constant" => {
                let name = self.prop_str(node, "name")?;
                builtin_constant(&name)
                    .map(|c| Ex::new(NodeKind::Const(c)))
                    .ok_or_else(|| {
                        KernelError::runtime(format!("unknown constant '{name}' in archive"))
                    })
            }
            "add" => {
                let (pairs, overall) = self.build_pairseq(node, id)?;
                Ok(pairseq::add_from_pairs(pairs, overall))
            }
            "mul" => {
                let (pairs, overall) = self.build_pairseq(node, id)?;
                Ok(pairseq::mul_from_pairs(pairs, overall))
            }
            "ncmul" => Ok(ncmul_many(self.prop_nodes(node, "factor", id)?)),
            "power" => {
                let base = self.prop_node(node, "base", id)?;
                let expo = self.prop_node(node, "expo", id)?;
                try_power(base, expo)
            }
            "function" => {
                let name = self.prop_str(node, "name")?;
                let args = self.prop_nodes(node, "arg", id)?;
                registry::serial_of(&name)
                    .ok_or_else(|| {
                        KernelError::runtime(format!("unknown function '{name}' in archive"))
                    })
                    .and_then(|serial| registry::fcall_serial(serial, args))
            }
            "list" => Ok(Ex::list(self.prop_nodes(node, "item", id)?)),
            "tuple" => Ok(Ex::tuple(self.prop_nodes(node, "item", id)?)),
            "matrix" => {
                let rows = self.prop_unsigned(node, "rows")? as usize;
                let cols = self.prop_unsigned(node, "cols")? as usize;
                let elems = self.prop_nodes(node, "elem", id)?;
                if elems.len() != rows * cols {
                    return Err(KernelError::runtime("matrix element count mismatch in archive"));
                }
                Ok(Ex::new(NodeKind::Matrix(Matrix::from_parts(
                    rows, cols, elems,
                ))))
            }
            "relational" => {
                let op = match self.prop_unsigned(node, "op")? {
                    0 => RelOp::Equal,
                    1 => RelOp::NotEqual,
                    2 => RelOp::Less,
                    3 => RelOp::LessEq,
                    4 => RelOp::Greater,
                    5 => RelOp::GreaterEq,
                    other => {
                        return Err(KernelError::runtime(format!(
                            "unknown relational operator {other} in archive"
                        )));
                    }
                };
                let lhs = self.prop_node(node, "lhs", id)?;
                let rhs = self.prop_node(node, "rhs", id)?;
                Ok(Ex::relational(lhs, rhs, op))
            }
            "series" => {
                let var = self.prop_node(node, "var", id)?;
                let point = self.prop_node(node, "point", id)?;
                let order = unzigzag(self.prop_unsigned(node, "order")?);
                let coeffs = self.prop_nodes(node, "coeff", id)?;
                let mut degrees = Vec::new();
                for p in &node.props {
                    if self.archive.atom_str(p.name)? == "degree" {
                        if let PropValue::Unsigned(v) = p.value {
                            degrees.push(unzigzag(v));
                        }
                    }
                }
                if coeffs.len() != degrees.len() {
                    return Err(KernelError::runtime("unbalanced series terms in archive"));
                }
                Ok(Ex::new(NodeKind::Series(Series {
                    var,
                    point,
                    terms: coeffs.into_iter().zip(degrees).collect(),
                    order,
                })))
            }
            "fail" => Ok(Ex::fail()),
            other => Err(KernelError::runtime(format!(
                "unknown class '{other}' in archive"
            ))),
        }
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

fn write_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v & 0x7f) as u8 | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn byte(&mut self) -> Result<u8, KernelError> {
        let b = self
            .bytes
            .get(self.pos)
            .copied()
            .ok_or_else(|| KernelError::runtime("truncated archive stream"))?;
        self.pos += 1;
        Ok(b)
    }

    fn varint(&mut self) -> Result<u64, KernelError> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.byte()?;
            if shift >= 64 {
                return Err(KernelError::runtime("overlong varint in archive"));
            }
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn string(&mut self) -> Result<String, KernelError> {
        let mut buf = Vec::new();
        loop {
            let b = self.byte()?;
            if b == 0 {
                break;
            }
            buf.push(b);
        }
        String::from_utf8(buf).map_err(|_| KernelError::runtime("non-UTF-8 string in archive"))
    }
}

impl Archive {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        write_varint(&mut out, ARCHIVE_VERSION);
        write_varint(&mut out, self.atoms.len() as u64);
        for atom in &self.atoms {
            out.extend_from_slice(atom.as_bytes());
            out.push(0);
        }
        write_varint(&mut out, self.exprs.len() as u64);
        for (name, root) in &self.exprs {
            write_varint(&mut out, u64::from(*name));
            write_varint(&mut out, u64::from(*root));
        }
        write_varint(&mut out, self.nodes.len() as u64);
        for node in &self.nodes {
            write_varint(&mut out, u64::from(node.class));
            write_varint(&mut out, node.props.len() as u64);
            for p in &node.props {
                let (tag, payload) = match p.value {
                    PropValue::Bool(b) => (TYPE_BOOL, u64::from(b)),
                    PropValue::Unsigned(v) => (TYPE_UNSIGNED, v),
                    PropValue::Str(a) => (TYPE_STRING, u64::from(a)),
                    PropValue::Node(n) => (TYPE_NODE, u64::from(n)),
                };
                write_varint(&mut out, (u64::from(p.name) << 3) | tag);
                write_varint(&mut out, payload);
            }
        }
        out
    }

    /// Write the archive to a stream.
    ///
    /// # Errors
    /// Propagates stream errors.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Parse an archive from bytes.
    ///
    /// # Errors
    /// `Runtime` for a bad magic, an unsupported version or a truncated or
    /// malformed stream.
    pub fn from_bytes(bytes: &[u8]) -> Result<Archive, KernelError> {
        let mut r = ByteReader { bytes, pos: 0 };
        let magic = [r.byte()?, r.byte()?, r.byte()?, r.byte()?];
        if magic != MAGIC {
            return Err(KernelError::runtime("not an archive (bad magic)"));
        }
        let version = r.varint()?;
        if version > ARCHIVE_VERSION || version < ARCHIVE_VERSION.saturating_sub(ARCHIVE_AGE) {
            return Err(KernelError::runtime(format!(
                "unsupported archive version {version} (supported {}..={})",
                ARCHIVE_VERSION.saturating_sub(ARCHIVE_AGE),
                ARCHIVE_VERSION
            )));
        }
        let mut archive = Archive::new();
        let atom_count = r.varint()?;
        for _ in 0..atom_count {
            let s = r.string()?;
            archive.atom_ids.insert(s.clone(), archive.atoms.len() as u32);
            archive.atoms.push(s);
        }
        let expr_count = r.varint()?;
        for _ in 0..expr_count {
            let name = u32::try_from(r.varint()?)
                .map_err(|_| KernelError::runtime("atom id overflow in archive"))?;
            let root = u32::try_from(r.varint()?)
                .map_err(|_| KernelError::runtime("node id overflow in archive"))?;
            archive.exprs.push((name, root));
        }
        let node_count = r.varint()?;
        for _ in 0..node_count {
            let class = u32::try_from(r.varint()?)
                .map_err(|_| KernelError::runtime("atom id overflow in archive"))?;
            let prop_count = r.varint()?;
            let mut props = Vec::with_capacity(prop_count as usize);
            for _ in 0..prop_count {
                let head = r.varint()?;
                let name = u32::try_from(head >> 3)
                    .map_err(|_| KernelError::runtime("atom id overflow in archive"))?;
                let payload = r.varint()?;
                let value = match head & 0x7 {
                    TYPE_BOOL => PropValue::Bool(payload != 0),
                    TYPE_UNSIGNED => PropValue::Unsigned(payload),
                    TYPE_STRING => PropValue::Str(
                        u32::try_from(payload)
                            .map_err(|_| KernelError::runtime("atom id overflow in archive"))?,
                    ),
                    TYPE_NODE => PropValue::Node(
                        u32::try_from(payload)
                            .map_err(|_| KernelError::runtime("node id overflow in archive"))?,
                    ),
                    other => {
                        return Err(KernelError::runtime(format!(
                            "unknown property type {other} in archive"
                        )));
                    }
                };
                props.push(Prop { name, value });
            }
            archive.nodes.push(ArchNode { class, props });
        }
        Ok(archive)
    }

    /// Read an archive from a stream.
    ///
    /// # Errors
    /// `Runtime` on stream errors or a malformed archive.
    pub fn read_from(r: &mut impl Read) -> Result<Archive, KernelError> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)
            .map_err(|e| KernelError::runtime(format!("archive read failed: {e}")))?;
        Archive::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(e: &Ex, symtab: &[Ex]) -> Ex {
        let mut a = Archive::new();
        a.archive_ex("test", e);
        let bytes = a.to_bytes();
        let b = Archive::from_bytes(&bytes).unwrap();
        b.unarchive_ex("test", symtab).unwrap()
    }

    #[test]
    fn numeric_round_trip() {
        for e in [
            Ex::numeric(42i64),
            Ex::numeric(Numeric::ratio(-3, 7)),
            Ex::numeric(2.5f64),
            Ex::i(),
        ] {
            assert_eq!(round_trip(&e, &[]), e);
        }
    }

    #[test]
    fn polynomial_round_trip_with_symtab() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = (x.pow(3) + 2i32 * &x * &y - Ex::half()).expand();
        let back = round_trip(&e, &[x.clone(), y.clone()]);
        assert_eq!(back, e);
    }

    #[test]
    fn second_write_pass_is_byte_identical() {
        let x = Ex::symbol("x");
        let e = x.sin().pow(2) + x.cos().pow(2);
        let mut a1 = Archive::new();
        a1.archive_ex("e", &e);
        let bytes1 = a1.to_bytes();
        let read = Archive::from_bytes(&bytes1).unwrap();
        let e2 = read.unarchive_ex("e", std::slice::from_ref(&x)).unwrap();
        assert_eq!(e2, e);
        let mut a2 = Archive::new();
        a2.archive_ex("e", &e2);
        assert_eq!(bytes1, a2.to_bytes());
    }

    #[test]
    fn shared_subtrees_stay_shared() {
        let x = Ex::symbol("x");
        let shared = (&x + 1i32).pow(2);
        let e = &shared * &shared.sin();
        let mut a = Archive::new();
        a.archive_ex("e", &e);
        // x, 1, x+1, 2, (x+1)^2, sin(..), product: the shared power is
        // archived once.
        let node_count = a.nodes.len();
        let b = Archive::from_bytes(&a.to_bytes()).unwrap();
        assert_eq!(b.nodes.len(), node_count);
        assert_eq!(b.unarchive_ex("e", &[x]).unwrap(), e);
    }

    #[test]
    fn bad_streams_are_rejected() {
        assert!(Archive::from_bytes(b"nope").is_err());
        let mut a = Archive::new();
        a.archive_ex("e", &Ex::one());
        let mut bytes = a.to_bytes();
        bytes.truncate(bytes.len() - 1);
        assert!(Archive::from_bytes(&bytes).is_err());
        // Unknown name lookup
        let full = Archive::from_bytes(&a.to_bytes()).unwrap();
        assert!(matches!(
            full.unarchive_ex("missing", &[]),
            Err(KernelError::Range { .. })
        ));
    }

    #[test]
    fn version_window() {
        let mut a = Archive::new();
        a.archive_ex("e", &Ex::one());
        let mut bytes = a.to_bytes();
        // Patch the version byte to something far in the future.
        bytes[4] = 0x7f;
        assert!(Archive::from_bytes(&bytes).is_err());
    }
}
