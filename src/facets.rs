//! Facet resolution
//!
//! Translates the tagged values of one model element into JSON Schema
//! constraint fields. Tags are first collected into a [`Facets`] set and then
//! applied, so the order in which tags appear on the element never matters.
//!
//! Numeric bounds resolve in three tiers:
//! 1. JSON-style facets (`minimum`, `exclusiveMinimum`, `maximum`, `exclusiveMaximum`)
//! 2. XSD-style facets (`minInclusive`, `minExclusive`, `maxInclusive`, `maxExclusive`)
//! 3. Bounds derived from `totalDigits` / `fractionDigits`

use tracing::trace;

use crate::model::TaggedValue;
use crate::schema::{Bound, SchemaNode};

/// Constraint facets gathered from one element's tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facets {
    pub length: Option<u64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub enum_values: Vec<String>,
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub xsd_minimum: Option<Bound>,
    pub xsd_maximum: Option<Bound>,
    pub multiple_of: Option<f64>,
    pub total_digits: Option<i32>,
    pub fraction_digits: Option<i32>,
}

impl Facets {
    /// Collect the recognized facets; unknown tags are skipped
    pub fn collect<'a>(tags: impl IntoIterator<Item = &'a TaggedValue>) -> Self {
        let mut facets = Self::default();
        for tag in tags {
            facets.record(&tag.name, &tag.value);
        }
        facets
    }

    fn record(&mut self, name: &str, value: &str) {
        match name.to_ascii_lowercase().as_str() {
            "length" => set_parsed(&mut self.length, name, value, parse_count),
            "minlength" => set_parsed(&mut self.min_length, name, value, parse_count),
            "maxlength" => set_parsed(&mut self.max_length, name, value, parse_count),
            "pattern" if !value.is_empty() => self.pattern = Some(value.to_string()),
            "format" if !value.is_empty() => self.format = Some(value.to_string()),
            "enum" => {
                let tokens = value.split(',').map(str::trim).filter(|t| !t.is_empty());
                for token in tokens {
                    if !self.enum_values.iter().any(|v| v == token) {
                        self.enum_values.push(token.to_string());
                    }
                }
            }
            "minimum" => set_parsed(&mut self.minimum, name, value, |v| {
                parse_number(v).map(Bound::inclusive)
            }),
            "exclusiveminimum" => set_parsed(&mut self.minimum, name, value, |v| {
                parse_number(v).map(Bound::exclusive)
            }),
            "maximum" => set_parsed(&mut self.maximum, name, value, |v| {
                parse_number(v).map(Bound::inclusive)
            }),
            "exclusivemaximum" => set_parsed(&mut self.maximum, name, value, |v| {
                parse_number(v).map(Bound::exclusive)
            }),
            "mininclusive" => set_parsed(&mut self.xsd_minimum, name, value, |v| {
                parse_number(v).map(Bound::inclusive)
            }),
            "minexclusive" => set_parsed(&mut self.xsd_minimum, name, value, |v| {
                parse_number(v).map(Bound::exclusive)
            }),
            "maxinclusive" => set_parsed(&mut self.xsd_maximum, name, value, |v| {
                parse_number(v).map(Bound::inclusive)
            }),
            "maxexclusive" => set_parsed(&mut self.xsd_maximum, name, value, |v| {
                parse_number(v).map(Bound::exclusive)
            }),
            "multipleof" => set_parsed(&mut self.multiple_of, name, value, parse_number),
            "totaldigits" => set_parsed(&mut self.total_digits, name, value, parse_digits),
            "fractiondigits" => set_parsed(&mut self.fraction_digits, name, value, parse_digits),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write the facets into a node
    pub fn apply_to(&self, node: &mut SchemaNode) {
        if let Some(length) = self.length {
            node.min_length = Some(length);
            node.max_length = Some(length);
        }
        if let Some(min) = self.min_length {
            node.min_length = Some(min);
        }
        if let Some(max) = self.max_length {
            node.max_length = Some(max);
        }

        // format wins over pattern, whoever set the format
        if let Some(format) = &self.format {
            node.format = Some(format.clone());
        }
        if let Some(pattern) = &self.pattern {
            if node.format.is_none() {
                node.pattern = Some(anchor(pattern));
            } else {
                trace!(pattern = %pattern, "pattern ignored, format already set");
            }
        }

        for value in &self.enum_values {
            node.push_enum(value.as_str());
        }

        let minimum = self.minimum.or(self.xsd_minimum);
        let maximum = self.maximum.or(self.xsd_maximum);
        if minimum.is_some() {
            node.minimum = minimum;
        }
        if maximum.is_some() {
            node.maximum = maximum;
        }
        if self.multiple_of.is_some() {
            node.multiple_of = self.multiple_of;
        }

        if let Some(total) = self.total_digits {
            let fraction = self.fraction_digits.unwrap_or(0);
            // digit counts outside f64 range derive nothing
            let limit = 10f64.powi(total - fraction);
            if limit.is_normal() {
                if maximum.is_none() {
                    node.maximum = Some(Bound::exclusive(limit));
                }
                if minimum.is_none() {
                    node.minimum = Some(Bound::exclusive(-limit));
                }
            } else {
                trace!(total, fraction, "derived bound out of range, skipped");
            }
            let step = 1.0 / 10f64.powi(fraction);
            if self.multiple_of.is_none() && fraction > 0 {
                if step.is_normal() {
                    node.multiple_of = Some(step);
                } else {
                    trace!(fraction, "derived multipleOf out of range, skipped");
                }
            }
        }
    }
}

/// Apply an element's facets to a node
pub fn apply_facets(tags: &[TaggedValue], node: &mut SchemaNode) {
    let facets = Facets::collect(tags);
    if !facets.is_empty() {
        facets.apply_to(node);
    }
}

/// Add `^`/`$` anchors where they are missing
pub fn anchor(pattern: &str) -> String {
    let mut anchored = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with('^') {
        anchored.push('^');
    }
    anchored.push_str(pattern);
    if !pattern.ends_with('$') {
        anchored.push('$');
    }
    anchored
}

fn set_parsed<T>(slot: &mut Option<T>, name: &str, value: &str, parse: impl Fn(&str) -> Option<T>) {
    match parse(value.trim()) {
        Some(parsed) => *slot = Some(parsed),
        None => trace!(facet = name, value, "ignoring unparsable facet value"),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_count(value: &str) -> Option<u64> {
    value.parse::<u64>().ok()
}

/// Digit counts must be non-negative whole numbers (`"5"` or `"5.0"`)
fn parse_digits(value: &str) -> Option<i32> {
    let digits = parse_number(value)?;
    if digits >= 0.0 && digits.fract() == 0.0 && digits <= f64::from(i32::MAX) {
        Some(digits as i32)
    } else {
        None
    }
}
