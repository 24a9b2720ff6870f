//! Earth Engine expression graphs
//!
//! Every computation is sent to the service as a graph of function
//! invocations. The wrappers here cover the algorithms vegscope uses; each
//! method wraps the receiver in a new invocation node, so a chain such as
//! `collection.median().divide(10000.0).clip(roi)` builds the graph bottom-up
//! and nothing runs until the expression is posted to the service.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use vegscope_map::{GeoCoord, Geometry};

/// One node of an expression graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    /// A literal JSON value
    ConstantValue(Value),
    /// A call into a server-side algorithm
    FunctionInvocationValue(FunctionInvocation),
}

/// A named algorithm applied to named arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    pub arguments: BTreeMap<String, ValueNode>,
}

impl ValueNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        ValueNode::ConstantValue(value.into())
    }

    pub fn call<'a>(name: &str, arguments: impl IntoIterator<Item = (&'a str, ValueNode)>) -> Self {
        ValueNode::FunctionInvocationValue(FunctionInvocation {
            function_name: name.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        })
    }

    /// Name of the invoked algorithm, if this node is an invocation
    pub fn function_name(&self) -> Option<&str> {
        match self {
            ValueNode::FunctionInvocationValue(call) => Some(&call.function_name),
            ValueNode::ConstantValue(_) => None,
        }
    }

    /// An argument of an invocation node
    pub fn argument(&self, name: &str) -> Option<&ValueNode> {
        match self {
            ValueNode::FunctionInvocationValue(call) => call.arguments.get(name),
            ValueNode::ConstantValue(_) => None,
        }
    }
}

/// A complete graph as posted in request bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, ValueNode>,
}

impl Expression {
    pub fn new(root: ValueNode) -> Self {
        let mut values = BTreeMap::new();
        values.insert("0".to_string(), root);
        Self {
            result: "0".to_string(),
            values,
        }
    }

    pub fn root(&self) -> Option<&ValueNode> {
        self.values.get(&self.result)
    }
}

/// Anything that can be evaluated by the service
pub trait Computed {
    fn node(&self) -> &ValueNode;

    fn to_expression(&self) -> Expression {
        Expression::new(self.node().clone())
    }
}

macro_rules! computed {
    ($($name:ident),* $(,)?) => {
        $(
            impl Computed for $name {
                fn node(&self) -> &ValueNode {
                    &self.0
                }
            }
        )*
    };
}

/// Server-side image
#[derive(Debug, Clone, PartialEq)]
pub struct Image(pub ValueNode);

/// Server-side image collection
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection(pub ValueNode);

/// Server-side geometry
#[derive(Debug, Clone, PartialEq)]
pub struct EeGeometry(pub ValueNode);

/// Collection filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(pub ValueNode);

/// Pixel reducer
#[derive(Debug, Clone, PartialEq)]
pub struct Reducer(pub ValueNode);

/// Server-side number
#[derive(Debug, Clone, PartialEq)]
pub struct Number(pub ValueNode);

/// Server-side dictionary (the output of region reductions)
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary(pub ValueNode);

computed!(Image, ImageCollection, EeGeometry, Filter, Reducer, Number, Dictionary);

fn date(value: &str) -> ValueNode {
    ValueNode::call("Date", [("value", ValueNode::constant(value))])
}

impl ImageCollection {
    /// Load a catalog collection by id, e.g. `COPERNICUS/S2_SR_HARMONIZED`
    pub fn load(id: &str) -> Self {
        Self(ValueNode::call(
            "ImageCollection.load",
            [("id", ValueNode::constant(id))],
        ))
    }

    pub fn filter(self, filter: Filter) -> Self {
        Self(ValueNode::call(
            "Collection.filter",
            [("collection", self.0), ("filter", filter.0)],
        ))
    }

    /// Keep images acquired in `[start, end)`; dates are `YYYY-MM-DD`
    pub fn filter_date(self, start: &str, end: &str) -> Self {
        self.filter(Filter::date(start, end))
    }

    /// Keep images whose footprint intersects the geometry
    pub fn filter_bounds(self, geometry: &EeGeometry) -> Self {
        self.filter(Filter::bounds(geometry))
    }

    pub fn size(&self) -> Number {
        Number(ValueNode::call(
            "Collection.size",
            [("collection", self.0.clone())],
        ))
    }

    /// Per-pixel median across the collection, band names unchanged
    pub fn median(&self) -> Image {
        Image(ValueNode::call(
            "reduce.median",
            [("collection", self.0.clone())],
        ))
    }
}

impl Filter {
    pub fn date(start: &str, end: &str) -> Self {
        let range = ValueNode::call("DateRange", [("start", date(start)), ("end", date(end))]);
        Self(ValueNode::call(
            "Filter.dateRangeContains",
            [
                ("leftValue", range),
                ("rightField", ValueNode::constant("system:time_start")),
            ],
        ))
    }

    pub fn bounds(geometry: &EeGeometry) -> Self {
        Self(ValueNode::call(
            "Filter.intersects",
            [
                ("leftField", ValueNode::constant(".all")),
                ("rightValue", geometry.0.clone()),
            ],
        ))
    }

    /// Property strictly less than a value
    pub fn lt(field: &str, value: f64) -> Self {
        Self(ValueNode::call(
            "Filter.lessThan",
            [
                ("leftField", ValueNode::constant(field)),
                ("rightValue", ValueNode::constant(value)),
            ],
        ))
    }
}

impl Image {
    pub fn constant(value: f64) -> Self {
        Self(ValueNode::call(
            "Image.constant",
            [("value", ValueNode::constant(value))],
        ))
    }

    pub fn divide(self, value: f64) -> Self {
        Self(ValueNode::call(
            "Image.divide",
            [("image1", self.0), ("image2", Image::constant(value).0)],
        ))
    }

    pub fn clip(self, geometry: &EeGeometry) -> Self {
        Self(ValueNode::call(
            "Image.clip",
            [("input", self.0), ("geometry", geometry.0.clone())],
        ))
    }

    /// `(first - second) / (first + second)` over the two named bands
    pub fn normalized_difference(self, first: &str, second: &str) -> Self {
        Self(ValueNode::call(
            "Image.normalizedDifference",
            [
                ("input", self.0),
                ("bandNames", ValueNode::constant(json!([first, second]))),
            ],
        ))
    }

    pub fn rename(self, name: &str) -> Self {
        Self(ValueNode::call(
            "Image.rename",
            [("input", self.0), ("names", ValueNode::constant(json!([name])))],
        ))
    }

    /// 1 where the pixel is >= value, 0 elsewhere
    pub fn gte(&self, value: f64) -> Self {
        Self(ValueNode::call(
            "Image.gte",
            [("image1", self.0.clone()), ("image2", Image::constant(value).0)],
        ))
    }

    pub fn update_mask(&self, mask: &Image) -> Self {
        Self(ValueNode::call(
            "Image.updateMask",
            [("image", self.0.clone()), ("mask", mask.0.clone())],
        ))
    }

    /// Apply a reducer to all pixels inside the geometry at a fixed scale
    pub fn reduce_region(
        &self,
        reducer: Reducer,
        geometry: &EeGeometry,
        scale: f64,
        max_pixels: f64,
    ) -> Dictionary {
        Dictionary(ValueNode::call(
            "Image.reduceRegion",
            [
                ("image", self.0.clone()),
                ("reducer", reducer.0),
                ("geometry", geometry.0.clone()),
                ("scale", ValueNode::constant(scale)),
                ("maxPixels", ValueNode::constant(max_pixels)),
            ],
        ))
    }
}

impl Reducer {
    fn named(name: &str) -> Self {
        Self(ValueNode::call(name, []))
    }

    pub fn count() -> Self {
        Self::named("Reducer.count")
    }

    pub fn sum() -> Self {
        Self::named("Reducer.sum")
    }

    pub fn mean() -> Self {
        Self::named("Reducer.mean")
    }

    pub fn min_max() -> Self {
        Self::named("Reducer.minMax")
    }

    pub fn combine(self, other: Reducer, shared_inputs: bool) -> Self {
        Self(ValueNode::call(
            "Reducer.combine",
            [
                ("reducer1", self.0),
                ("reducer2", other.0),
                ("sharedInputs", ValueNode::constant(shared_inputs)),
            ],
        ))
    }
}

impl EeGeometry {
    pub fn point(coord: GeoCoord) -> Self {
        Self(ValueNode::call(
            "GeometryConstructors.Point",
            [("coordinates", ValueNode::constant(json!(coord.to_position())))],
        ))
    }

    /// A drawn GeoJSON region
    pub fn from_geojson(geometry: &Geometry) -> Self {
        let (name, coordinates) = match geometry {
            Geometry::Polygon { coordinates } => {
                ("GeometryConstructors.Polygon", json!(coordinates))
            }
            Geometry::MultiPolygon { coordinates } => {
                ("GeometryConstructors.MultiPolygon", json!(coordinates))
            }
        };
        Self(ValueNode::call(
            name,
            [
                ("coordinates", ValueNode::constant(coordinates)),
                ("evenOdd", ValueNode::constant(true)),
            ],
        ))
    }

    /// Grow the geometry by `distance` meters
    pub fn buffer(self, distance: f64) -> Self {
        Self(ValueNode::call(
            "Geometry.buffer",
            [("geometry", self.0), ("distance", ValueNode::constant(distance))],
        ))
    }

    /// Area in square meters
    pub fn area(&self) -> Number {
        Number(ValueNode::call(
            "Geometry.area",
            [("geometry", self.0.clone())],
        ))
    }
}
