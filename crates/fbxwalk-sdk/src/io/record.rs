/// A single property value of a record, as stored by either file encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Raw(Vec<u8>),
    BoolArray(Vec<bool>),
    I32Array(Vec<i32>),
    I64Array(Vec<i64>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(value) => Some(f64::from(u8::from(*value))),
            Self::I16(value) => Some(f64::from(*value)),
            Self::I32(value) => Some(f64::from(*value)),
            Self::I64(value) => Some(*value as f64),
            Self::F32(value) => Some(f64::from(*value)),
            Self::F64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(value) => Some(i64::from(*value)),
            Self::I16(value) => Some(i64::from(*value)),
            Self::I32(value) => Some(i64::from(*value)),
            Self::I64(value) => Some(*value),
            Self::F32(value) => Some(*value as i64),
            Self::F64(value) => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    fn is_array(&self) -> bool {
        matches!(
            self,
            Self::BoolArray(_)
                | Self::I32Array(_)
                | Self::I64Array(_)
                | Self::F32Array(_)
                | Self::F64Array(_)
        )
    }

    fn extend_f64(&self, out: &mut Vec<f64>) {
        match self {
            Self::BoolArray(values) => out.extend(values.iter().map(|&v| f64::from(u8::from(v)))),
            Self::I32Array(values) => out.extend(values.iter().map(|&v| f64::from(v))),
            Self::I64Array(values) => out.extend(values.iter().map(|&v| v as f64)),
            Self::F32Array(values) => out.extend(values.iter().map(|&v| f64::from(v))),
            Self::F64Array(values) => out.extend_from_slice(values),
            scalar => out.extend(scalar.as_f64()),
        }
    }

    fn extend_i64(&self, out: &mut Vec<i64>) {
        match self {
            Self::BoolArray(values) => out.extend(values.iter().map(|&v| i64::from(v))),
            Self::I32Array(values) => out.extend(values.iter().map(|&v| i64::from(v))),
            Self::I64Array(values) => out.extend_from_slice(values),
            Self::F32Array(values) => out.extend(values.iter().map(|&v| v as i64)),
            Self::F64Array(values) => out.extend(values.iter().map(|&v| v as i64)),
            scalar => out.extend(scalar.as_i64()),
        }
    }
}

/// A named record with its values and nested records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub name: String,
    pub values: Vec<Value>,
    pub children: Vec<Record>,
}

impl Record {
    pub fn new(name: &str, values: Vec<Value>) -> Self {
        Self {
            name: name.to_owned(),
            values,
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Record> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn str_value(&self, index: usize) -> Option<&str> {
        self.value(index).and_then(Value::as_str)
    }

    pub fn i64_value(&self, index: usize) -> Option<i64> {
        self.value(index).and_then(Value::as_i64)
    }

    pub fn f64_value(&self, index: usize) -> Option<f64> {
        self.value(index).and_then(Value::as_f64)
    }

    /// Numeric payload of the record, whether stored as one array or as a flat value list.
    pub fn f64_array(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for value in self.values.iter().filter(|value| value.is_array() || value.as_f64().is_some()) {
            value.extend_f64(&mut out);
        }
        out
    }

    pub fn i64_array(&self) -> Vec<i64> {
        let mut out = Vec::new();
        for value in self.values.iter().filter(|value| value.is_array() || value.as_i64().is_some()) {
            value.extend_i64(&mut out);
        }
        out
    }

    /// Integer payload narrowed to `i32`, failing on values that do not fit.
    pub fn i32_array(&self) -> Result<Vec<i32>, String> {
        self.i64_array()
            .into_iter()
            .map(|value| {
                i32::try_from(value).map_err(|_| format!("{} holds out of range index {}", self.name, value))
            })
            .collect()
    }

    /// Payload of a child record such as `Vertices` or `PolygonVertexIndex`.
    pub fn child_f64_array(&self, name: &str) -> Option<Vec<f64>> {
        self.child(name).map(Record::f64_array)
    }
}

/// A parsed file: the format version and its top level records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub version: u32,
    pub records: Vec<Record>,
}

impl Document {
    pub fn find(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.name == name)
    }
}
