//! Reads models in the [MPS](https://en.wikipedia.org/wiki/MPS_(format)) format.
//!
//! Both the free format (whitespace separated fields) and the historical fixed format
//! (fields at fixed column positions, names may contain spaces) are supported.
//!
//! ```
//! use mip_lp::mps::{parse_mps, MpsFormat};
//! use mip_lp::{ObjectiveDirection, SolveConfig, SolveStatus};
//!
//! let text = "\
//! NAME          TINY
//! OBJSENSE
//!     MAX
//! ROWS
//!  N  profit
//!  L  cap
//! COLUMNS
//!     x  profit  1  cap  1
//!     y  profit  2  cap  1
//! RHS
//!     rhs  cap  5
//! ENDATA
//! ";
//! let mut parsed = parse_mps(text, MpsFormat::Free)?;
//! assert_eq!(parsed.name, "TINY");
//! assert_eq!(parsed.direction, ObjectiveDirection::Maximisation);
//! let result = parsed.optimise(&SolveConfig::default());
//! assert_eq!(result.status(), SolveStatus::Optimal);
//! assert_eq!(result.objective(), 10.);
//! # Ok::<_, mip_lp::mps::MpsError>(())
//! ```
use std::fmt::{Display, Formatter};
use std::path::Path;

use fnv::FnvHashMap as HashMap;
use log::{debug, warn};

use crate::model::{Model, ModelError};
use crate::solvers::{ObjectiveDirection, SolveResult};
use crate::{variable, Constraint, Expression, SolveConfig};

/// The two layouts of MPS files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MpsFormat {
    /// Fields separated by whitespace
    #[default]
    Free,
    /// Fields at fixed column positions
    Fixed,
}

/// An error while reading an MPS file
#[derive(Debug)]
pub enum MpsError {
    /// The file does not follow the format
    Format {
        /// 1-based line number
        line: usize,
        /// what is wrong
        reason: String,
    },
    /// A bound refers to a column that was not declared in COLUMNS
    UnknownVariable {
        /// 1-based line number
        line: usize,
        /// the column name
        name: String,
    },
    /// A coefficient, right-hand side or range refers to an undeclared row
    UnknownRow {
        /// 1-based line number
        line: usize,
        /// the row name
        name: String,
    },
    /// The described model is invalid
    Model(ModelError),
    /// The file could not be read
    Io(std::io::Error),
}

impl Display for MpsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MpsError::Format { line, reason } => write!(f, "line {}: {}", line, reason),
            MpsError::UnknownVariable { line, name } => {
                write!(f, "line {}: unknown column {:?}", line, name)
            }
            MpsError::UnknownRow { line, name } => {
                write!(f, "line {}: unknown row {:?}", line, name)
            }
            MpsError::Model(e) => write!(f, "invalid model: {}", e),
            MpsError::Io(e) => write!(f, "cannot read the file: {}", e),
        }
    }
}

impl std::error::Error for MpsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MpsError::Model(e) => Some(e),
            MpsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for MpsError {
    fn from(e: ModelError) -> Self {
        MpsError::Model(e)
    }
}

impl From<std::io::Error> for MpsError {
    fn from(e: std::io::Error) -> Self {
        MpsError::Io(e)
    }
}

/// A model read from an MPS file, with the metadata the file declares
#[derive(Debug, Clone)]
pub struct MpsModel {
    /// The model
    pub model: Model,
    /// Content of the NAME section, empty if absent
    pub name: String,
    /// Name of the objective row
    pub objective_name: String,
    /// Declared by OBJSENSE, minimisation by default
    pub direction: ObjectiveDirection,
}

impl MpsModel {
    /// Solve the model in its declared direction, and commit the solution to it
    pub fn optimise(&mut self, config: &SolveConfig) -> SolveResult {
        self.model.optimise(self.direction, config)
    }
}

/// Read an MPS file from disk
pub fn read_mps_file<P: AsRef<Path>>(path: P, format: MpsFormat) -> Result<MpsModel, MpsError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    debug!("parsing {}", path.as_ref().display());
    parse_mps(&text, format)
}

/// Parse the content of an MPS file
pub fn parse_mps(text: &str, format: MpsFormat) -> Result<MpsModel, MpsError> {
    let mut parser = Parser::default();
    let mut last_line = 0;
    for (index, raw) in text.lines().enumerate() {
        last_line = index + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() || line.starts_with('*') {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            if parser.header(last_line, line)? {
                return parser.finish();
            }
            continue;
        }
        let fields: Vec<&str> = match format {
            MpsFormat::Free => line.split_whitespace().collect(),
            MpsFormat::Fixed => fixed_fields(line),
        };
        parser.data(last_line, &fields)?;
    }
    Err(MpsError::Format {
        line: last_line,
        reason: "missing ENDATA".into(),
    })
}

/// Column positions (0-based, end exclusive) of the six fields of the fixed format
const FIXED_FIELDS: [(usize, usize); 6] = [(1, 3), (4, 12), (14, 22), (24, 36), (39, 47), (49, 61)];

fn fixed_fields(line: &str) -> Vec<&str> {
    FIXED_FIELDS
        .iter()
        .filter_map(|&(start, end)| line.get(start..end.min(line.len())))
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Start,
    Name,
    ObjSense,
    Rows,
    Columns,
    Rhs,
    Ranges,
    Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Less,
    Greater,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSlot {
    Objective,
    /// Additional free rows are dropped
    Ignored,
    Row(usize),
}

#[derive(Debug)]
struct Row {
    name: String,
    kind: RowKind,
    rhs: f64,
    range: Option<f64>,
}

impl Row {
    fn limits(&self) -> (f64, f64) {
        let rhs = self.rhs;
        match (self.kind, self.range) {
            (RowKind::Less, None) => (f64::NEG_INFINITY, rhs),
            (RowKind::Greater, None) => (rhs, f64::INFINITY),
            (RowKind::Equal, None) => (rhs, rhs),
            (RowKind::Less, Some(r)) => (rhs - r.abs(), rhs),
            (RowKind::Greater, Some(r)) => (rhs, rhs + r.abs()),
            (RowKind::Equal, Some(r)) if r >= 0. => (rhs, rhs + r),
            (RowKind::Equal, Some(r)) => (rhs + r, rhs),
        }
    }
}

#[derive(Debug)]
struct Column {
    name: String,
    integer: bool,
    binary: bool,
    objective: f64,
    entries: Vec<(usize, f64)>,
    lower: f64,
    upper: f64,
}

#[derive(Debug)]
struct Parser {
    section: Section,
    name: String,
    direction: ObjectiveDirection,
    objective_name: Option<String>,
    objective_constant: f64,
    rows: Vec<Row>,
    row_index: HashMap<String, RowSlot>,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
    in_integer_block: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            section: Section::Start,
            name: String::new(),
            direction: ObjectiveDirection::Minimisation,
            objective_name: None,
            objective_constant: 0.,
            rows: vec![],
            row_index: HashMap::default(),
            columns: vec![],
            column_index: HashMap::default(),
            in_integer_block: false,
        }
    }
}

fn format_error<T>(line: usize, reason: impl Into<String>) -> Result<T, MpsError> {
    Err(MpsError::Format {
        line,
        reason: reason.into(),
    })
}

fn number(line: usize, field: &str) -> Result<f64, MpsError> {
    field.parse().or_else(|_| format_error(line, format!("invalid number {:?}", field)))
}

fn sense(line: usize, field: &str) -> Result<ObjectiveDirection, MpsError> {
    match field.to_ascii_uppercase().as_str() {
        "MAX" | "MAXIMIZE" | "MAXIMISE" => Ok(ObjectiveDirection::Maximisation),
        "MIN" | "MINIMIZE" | "MINIMISE" => Ok(ObjectiveDirection::Minimisation),
        _ => format_error(line, format!("invalid objective sense {:?}", field)),
    }
}

/// Drop the optional set name of RHS and RANGES lines, which come as
/// `[set] row value [row value]`
fn without_set_name<'a, 'b>(fields: &'a [&'b str]) -> &'a [&'b str] {
    if fields.len() % 2 == 1 {
        &fields[1..]
    } else {
        fields
    }
}

impl Parser {
    /// Handle a section header. Returns true on ENDATA.
    fn header(&mut self, line: usize, text: &str) -> Result<bool, MpsError> {
        let mut words = text.split_whitespace();
        let keyword = words.next().unwrap_or_default();
        self.section = match keyword {
            "NAME" => {
                self.name = text["NAME".len()..].trim().to_string();
                Section::Name
            }
            "OBJSENSE" => {
                if let Some(value) = words.next() {
                    self.direction = sense(line, value)?;
                }
                Section::ObjSense
            }
            "ROWS" => Section::Rows,
            "COLUMNS" => Section::Columns,
            "RHS" => Section::Rhs,
            "RANGES" => Section::Ranges,
            "BOUNDS" => Section::Bounds,
            "ENDATA" => return Ok(true),
            other => return format_error(line, format!("unknown section {:?}", other)),
        };
        Ok(false)
    }

    fn data(&mut self, line: usize, fields: &[&str]) -> Result<(), MpsError> {
        match self.section {
            Section::Start | Section::Name => format_error(line, "data outside of a section"),
            Section::ObjSense => match fields {
                [value] => {
                    self.direction = sense(line, value)?;
                    Ok(())
                }
                _ => format_error(line, "expected MAX or MIN"),
            },
            Section::Rows => self.row(line, fields),
            Section::Columns => self.column(line, fields),
            Section::Rhs => self.rhs(line, fields),
            Section::Ranges => self.range(line, fields),
            Section::Bounds => self.bound(line, fields),
        }
    }

    fn row(&mut self, line: usize, fields: &[&str]) -> Result<(), MpsError> {
        let [kind, name] = fields else {
            return format_error(line, "a row needs a type and a name");
        };
        let kind = match kind.to_ascii_uppercase().as_str() {
            "N" => None,
            "L" => Some(RowKind::Less),
            "G" => Some(RowKind::Greater),
            "E" => Some(RowKind::Equal),
            other => return format_error(line, format!("invalid row type {:?}", other)),
        };
        if self.row_index.contains_key(*name) {
            return Err(ModelError::DuplicateName(name.to_string()).into());
        }
        let slot = match kind {
            None if self.objective_name.is_none() => {
                self.objective_name = Some(name.to_string());
                RowSlot::Objective
            }
            None => {
                debug!("line {}: additional free row {:?} ignored", line, name);
                RowSlot::Ignored
            }
            Some(kind) => {
                self.rows.push(Row {
                    name: name.to_string(),
                    kind,
                    rhs: 0.,
                    range: None,
                });
                RowSlot::Row(self.rows.len() - 1)
            }
        };
        self.row_index.insert(name.to_string(), slot);
        Ok(())
    }

    fn slot(&self, line: usize, name: &str) -> Result<RowSlot, MpsError> {
        self.row_index
            .get(name)
            .copied()
            .ok_or_else(|| MpsError::UnknownRow {
                line,
                name: name.to_string(),
            })
    }

    fn column(&mut self, line: usize, fields: &[&str]) -> Result<(), MpsError> {
        if fields.len() == 3 && fields[1] == "'MARKER'" {
            match fields[2] {
                "'INTORG'" => self.in_integer_block = true,
                "'INTEND'" => self.in_integer_block = false,
                other => return format_error(line, format!("invalid marker {:?}", other)),
            }
            return Ok(());
        }
        if fields.len() != 3 && fields.len() != 5 {
            return format_error(line, "expected a column name and one or two (row, value) pairs");
        }
        let name = fields[0];
        let index = match self.column_index.get(name) {
            Some(&index) => index,
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    integer: self.in_integer_block,
                    binary: false,
                    objective: 0.,
                    entries: vec![],
                    lower: 0.,
                    upper: f64::INFINITY,
                });
                self.column_index.insert(name.to_string(), self.columns.len() - 1);
                self.columns.len() - 1
            }
        };
        for pair in fields[1..].chunks(2) {
            let value = number(line, pair[1])?;
            match self.slot(line, pair[0])? {
                RowSlot::Objective => self.columns[index].objective += value,
                RowSlot::Ignored => {}
                RowSlot::Row(row) => self.columns[index].entries.push((row, value)),
            }
        }
        Ok(())
    }

    fn rhs(&mut self, line: usize, fields: &[&str]) -> Result<(), MpsError> {
        let pairs = without_set_name(fields);
        if pairs.is_empty() || pairs.len() > 4 {
            return format_error(line, "expected one or two (row, value) pairs");
        }
        for pair in pairs.chunks(2) {
            let value = number(line, pair[1])?;
            match self.slot(line, pair[0])? {
                RowSlot::Objective => self.objective_constant = -value,
                RowSlot::Ignored => {}
                RowSlot::Row(row) => self.rows[row].rhs = value,
            }
        }
        Ok(())
    }

    fn range(&mut self, line: usize, fields: &[&str]) -> Result<(), MpsError> {
        let pairs = without_set_name(fields);
        if pairs.is_empty() || pairs.len() > 4 {
            return format_error(line, "expected one or two (row, value) pairs");
        }
        for pair in pairs.chunks(2) {
            let value = number(line, pair[1])?;
            match self.slot(line, pair[0])? {
                RowSlot::Row(row) => self.rows[row].range = Some(value),
                RowSlot::Objective | RowSlot::Ignored => {
                    warn!("line {}: range on free row {:?} ignored", line, pair[0]);
                }
            }
        }
        Ok(())
    }

    fn bound(&mut self, line: usize, fields: &[&str]) -> Result<(), MpsError> {
        let Some((kind, rest)) = fields.split_first() else {
            return format_error(line, "empty bound");
        };
        let kind = kind.to_ascii_uppercase();
        let needs_value = matches!(kind.as_str(), "UP" | "LO" | "FX" | "LI" | "UI");
        let (column_name, value) = match (needs_value, rest) {
            (true, [_, column, value]) | (true, [column, value]) => (*column, Some(*value)),
            (false, [_, column, value]) if kind == "BV" => (*column, Some(*value)),
            (false, [_, column]) | (false, [column]) => (*column, None),
            _ => return format_error(line, format!("invalid {} bound", kind)),
        };
        let index = *self
            .column_index
            .get(column_name)
            .ok_or_else(|| MpsError::UnknownVariable {
                line,
                name: column_name.to_string(),
            })?;
        let value = value.map(|v| number(line, v)).transpose()?;
        let column = &mut self.columns[index];
        match (kind.as_str(), value) {
            ("UP", Some(v)) => {
                if v < 0. && column.lower == 0. {
                    warn!(
                        "line {}: negative upper bound on {:?}, its lower bound becomes -inf",
                        line, column.name
                    );
                    column.lower = f64::NEG_INFINITY;
                }
                column.upper = v;
            }
            ("LO", Some(v)) => column.lower = v,
            ("FX", Some(v)) => {
                column.lower = v;
                column.upper = v;
            }
            ("FR", _) => {
                column.lower = f64::NEG_INFINITY;
                column.upper = f64::INFINITY;
            }
            ("MI", _) => column.lower = f64::NEG_INFINITY,
            ("PL", _) => column.upper = f64::INFINITY,
            ("BV", _) => {
                column.integer = true;
                column.binary = true;
                column.lower = 0.;
                column.upper = 1.;
            }
            ("LI", Some(v)) => {
                column.integer = true;
                column.lower = v;
            }
            ("UI", Some(v)) => {
                column.integer = true;
                column.upper = v;
            }
            _ => return format_error(line, format!("unknown bound type {:?}", kind)),
        }
        Ok(())
    }

    fn finish(self) -> Result<MpsModel, MpsError> {
        let objective_name = match self.objective_name {
            Some(name) => name,
            None => return format_error(0, "no objective row (type N) declared"),
        };
        let mut model = Model::new();
        let mut objective = Expression::with_capacity(self.columns.len());
        let mut bodies: Vec<Expression> = (0..self.rows.len()).map(|_| Expression::default()).collect();
        for column in &self.columns {
            let mut definition = variable().name(column.name.clone());
            if column.binary {
                definition = definition.binary();
            } else if column.integer {
                definition = definition.integer();
            }
            // bound lines after BV still apply
            let definition = definition.clamp(column.lower, column.upper);
            let var = model.add_variable(definition)?;
            objective.add_linear_term(var, column.objective);
            for &(row, value) in &column.entries {
                bodies[row].add_linear_term(var, value);
            }
        }
        objective.add_constant(self.objective_constant);
        model.set_objective(objective);
        for (row, body) in self.rows.iter().zip(bodies) {
            let (lower, upper) = row.limits();
            model.add_constraint(Constraint::range(body, lower, upper).set_name(row.name.clone()))?;
        }
        debug!(
            "read {:?}: {} columns, {} rows, {}",
            self.name,
            model.len(),
            model.num_constraints(),
            self.direction
        );
        Ok(MpsModel {
            model,
            name: self.name,
            objective_name,
            direction: self.direction,
        })
    }
}
