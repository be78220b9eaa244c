//! Processor Registry
//!
//! Field processors are small functions that each fill in part of a conversion
//! target. The registry keeps one independent set of processors for each
//! orchestration point:
//!
//! - [`ProcessorPoint::Request`] builds the top-level OpenRTB request.
//! - [`ProcessorPoint::Imp`] builds one OpenRTB imp per internal bid request.
//! - [`ProcessorPoint::BidResponse`] builds one internal bid per OpenRTB bid.
//!
//! # Identity and ordering
//!
//! Within a point, a processor is identified by its name. Registering a name that
//! already exists replaces the entry in place, so an adapter can disable a
//! default by registering a no-op under its name, or change its behaviour by
//! registering something else.
//!
//! [`ProcessorRegistry::resolve`] orders a set by descending priority. The sort
//! is stable: entries with equal priority run in registration order, and a
//! replaced entry keeps the slot of the entry it replaced.
//!
//! ```text
//! imp:  fpd(99) ─▶ id(0) ─▶ banner(0) ─▶ video(0) ─▶ ... ─▶ bidfloor(0)
//! ```
//!
//! The registry is configured before any conversion runs and is only read while
//! converting. It is `Clone`, which is how tests snapshot and restore it.

use crate::context::ConversionContext;
use crate::errors::{ConverterError, Result};
use crate::json::JsonObject;
use crate::protocol::{BidRequest, BidResponse, BidderRequest, OrtbBid};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Stage of the conversion a processor contributes to.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorPoint {
    Request,
    Imp,
    BidResponse,
}

impl ProcessorPoint {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessorPoint::Request => "request",
            ProcessorPoint::Imp => "imp",
            ProcessorPoint::BidResponse => "bid_response",
        }
    }
}

impl fmt::Display for ProcessorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessorPoint {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "request" => Ok(ProcessorPoint::Request),
            "imp" => Ok(ProcessorPoint::Imp),
            "bid_response" => Ok(ProcessorPoint::BidResponse),
            other => Err(ConverterError::UnknownPoint(other.to_string())),
        }
    }
}

/// `<point>.<name>` address of a processor, e.g. `imp.secure`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorKey {
    pub point: ProcessorPoint,
    pub name: String,
}

impl FromStr for ProcessorKey {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        let (point, name) = s
            .split_once('.')
            .filter(|(_, name)| !name.is_empty())
            .ok_or_else(|| ConverterError::InvalidProcessorKey(s.to_string()))?;

        Ok(ProcessorKey {
            point: point.parse()?,
            name: name.to_string(),
        })
    }
}

pub type RequestProcessorFn =
    dyn Fn(&mut JsonObject, &BidderRequest, &ConversionContext<'_>) + Send + Sync;
pub type ImpProcessorFn = dyn Fn(&mut JsonObject, &BidRequest, &ConversionContext<'_>) + Send + Sync;
pub type BidResponseProcessorFn =
    dyn Fn(&mut BidResponse, &OrtbBid, &ConversionContext<'_>) + Send + Sync;

/// A processor function, tagged with the point it was written for.
#[derive(Clone)]
pub enum Processor {
    /// Fills the OpenRTB request from the bidder request.
    Request(Arc<RequestProcessorFn>),
    /// Fills one OpenRTB imp from one bid request.
    Imp(Arc<ImpProcessorFn>),
    /// Fills one bid response from one OpenRTB bid.
    BidResponse(Arc<BidResponseProcessorFn>),
}

impl Processor {
    pub fn request<F>(f: F) -> Self
    where
        F: Fn(&mut JsonObject, &BidderRequest, &ConversionContext<'_>) + Send + Sync + 'static,
    {
        Processor::Request(Arc::new(f))
    }

    pub fn imp<F>(f: F) -> Self
    where
        F: Fn(&mut JsonObject, &BidRequest, &ConversionContext<'_>) + Send + Sync + 'static,
    {
        Processor::Imp(Arc::new(f))
    }

    pub fn bid_response<F>(f: F) -> Self
    where
        F: Fn(&mut BidResponse, &OrtbBid, &ConversionContext<'_>) + Send + Sync + 'static,
    {
        Processor::BidResponse(Arc::new(f))
    }

    /// A processor that does nothing, used to switch off a default.
    pub fn noop(point: ProcessorPoint) -> Self {
        match point {
            ProcessorPoint::Request => Processor::request(|_, _, _| {}),
            ProcessorPoint::Imp => Processor::imp(|_, _, _| {}),
            ProcessorPoint::BidResponse => Processor::bid_response(|_, _, _| {}),
        }
    }

    pub fn point(&self) -> ProcessorPoint {
        match self {
            Processor::Request(_) => ProcessorPoint::Request,
            Processor::Imp(_) => ProcessorPoint::Imp,
            Processor::BidResponse(_) => ProcessorPoint::BidResponse,
        }
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processor::{}", self.point())
    }
}

#[derive(Clone, Debug)]
pub struct ProcessorEntry {
    pub name: String,
    /// Higher runs first.
    pub priority: i32,
    pub processor: Processor,
}

type ProcessorSet = IndexMap<String, ProcessorEntry>;

#[derive(Clone, Debug, Default)]
pub struct ProcessorRegistry {
    request: ProcessorSet,
    imp: ProcessorSet,
    bid_response: ProcessorSet,
}

impl ProcessorRegistry {
    /// Creates a registry with no processors at all.
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, point: ProcessorPoint) -> &ProcessorSet {
        match point {
            ProcessorPoint::Request => &self.request,
            ProcessorPoint::Imp => &self.imp,
            ProcessorPoint::BidResponse => &self.bid_response,
        }
    }

    fn set_mut(&mut self, point: ProcessorPoint) -> &mut ProcessorSet {
        match point {
            ProcessorPoint::Request => &mut self.request,
            ProcessorPoint::Imp => &mut self.imp,
            ProcessorPoint::BidResponse => &mut self.bid_response,
        }
    }

    /// Registers `processor` under `(point, name)`, replacing any existing entry.
    ///
    /// Returns the replaced entry. Fails if the processor was built for a
    /// different point.
    pub fn register(
        &mut self,
        point: ProcessorPoint,
        name: impl Into<String>,
        priority: i32,
        processor: Processor,
    ) -> Result<Option<ProcessorEntry>> {
        let name = name.into();
        if processor.point() != point {
            return Err(ConverterError::PointMismatch {
                name,
                expected: point,
                found: processor.point(),
            });
        }

        let entry = ProcessorEntry {
            name: name.clone(),
            priority,
            processor,
        };
        Ok(self.set_mut(point).insert(name, entry))
    }

    /// Removes `(point, name)`. Absent entries are ignored.
    pub fn unregister(&mut self, point: ProcessorPoint, name: &str) -> Option<ProcessorEntry> {
        self.set_mut(point).shift_remove(name)
    }

    /// Replaces `(point, name)` with a no-op, keeping its priority.
    pub fn disable(&mut self, point: ProcessorPoint, name: &str) -> Result<()> {
        self.wrap(point, name, |_| Processor::noop(point))
    }

    /// Replaces `(point, name)` with `f(current)`, keeping name and priority.
    ///
    /// Lets callers decorate a processor instead of rewriting it.
    pub fn wrap<F>(&mut self, point: ProcessorPoint, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(Processor) -> Processor,
    {
        let entry = self
            .set_mut(point)
            .get_mut(name)
            .ok_or_else(|| ConverterError::UnknownProcessor {
                point,
                name: name.to_string(),
            })?;

        let wrapped = f(entry.processor.clone());
        if wrapped.point() != point {
            return Err(ConverterError::PointMismatch {
                name: name.to_string(),
                expected: point,
                found: wrapped.point(),
            });
        }
        entry.processor = wrapped;
        Ok(())
    }

    pub fn get(&self, point: ProcessorPoint, name: &str) -> Option<&ProcessorEntry> {
        self.set(point).get(name)
    }

    pub fn contains(&self, point: ProcessorPoint, name: &str) -> bool {
        self.set(point).contains_key(name)
    }

    pub fn len(&self, point: ProcessorPoint) -> usize {
        self.set(point).len()
    }

    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.imp.is_empty() && self.bid_response.is_empty()
    }

    /// Entries of `point` in execution order: descending priority, ties in
    /// registration order.
    pub fn resolve(&self, point: ProcessorPoint) -> Vec<ProcessorEntry> {
        let mut entries: Vec<ProcessorEntry> = self.set(point).values().cloned().collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.priority));
        entries
    }

    /// Names of `point` in execution order.
    pub fn resolved_names(&self, point: ProcessorPoint) -> Vec<String> {
        self.resolve(point)
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    }

    pub(crate) fn request_processors(&self) -> Vec<Arc<RequestProcessorFn>> {
        self.resolve(ProcessorPoint::Request)
            .into_iter()
            .filter_map(|entry| match entry.processor {
                Processor::Request(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn imp_processors(&self) -> Vec<Arc<ImpProcessorFn>> {
        self.resolve(ProcessorPoint::Imp)
            .into_iter()
            .filter_map(|entry| match entry.processor {
                Processor::Imp(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn bid_response_processors(&self) -> Vec<Arc<BidResponseProcessorFn>> {
        self.resolve(ProcessorPoint::BidResponse)
            .into_iter()
            .filter_map(|entry| match entry.processor {
                Processor::BidResponse(f) => Some(f),
                _ => None,
            })
            .collect()
    }
}
