//! Shared targets for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use courier_advice::{Advisable, MethodResult, MethodTable};
use courier_events::{Args, HandlerResult, Hitch, HitchFn, Value};

/// A Math-like object whose functions live in replaceable slots.
pub struct Maths {
    methods: MethodTable,
}

impl Advisable for Maths {
    fn methods(&self) -> &MethodTable {
        &self.methods
    }
}

fn numbers(args: &Args) -> Result<Vec<f64>, &'static str> {
    args.iter()
        .map(|value| value.downcast_ref::<f64>().copied().ok_or("expected f64 argument"))
        .collect()
}

fn pow(_: &Value, args: &Args) -> MethodResult {
    let base = *args.get::<f64>(0).ok_or("pow: missing base")?;
    let exp = *args.get::<f64>(1).ok_or("pow: missing exponent")?;
    Ok(Value::new(base.powf(exp)))
}

fn min(_: &Value, args: &Args) -> MethodResult {
    let smallest = numbers(args)?.into_iter().fold(f64::INFINITY, f64::min);
    Ok(Value::new(smallest))
}

fn max(_: &Value, args: &Args) -> MethodResult {
    let largest = numbers(args)?.into_iter().fold(f64::NEG_INFINITY, f64::max);
    Ok(Value::new(largest))
}

/// Build a fresh [`Maths`] with `pow`, `min` and `max`.
pub fn maths() -> Arc<Maths> {
    Arc::new(Maths {
        methods: MethodTable::new()
            .with_method("pow", pow)
            .with_method("min", min)
            .with_method("max", max),
    })
}

/// An object with members named after weather symbols, for hitching.
#[derive(Default)]
pub struct Sky {
    seen: Mutex<Vec<&'static str>>,
}

impl Sky {
    fn mark(&self, symbol: &'static str) -> HandlerResult {
        self.seen
            .lock()
            .map_err(|_| "sky lock poisoned")?
            .push(symbol);
        Ok(())
    }

    fn snowman(&self, _: &Args) -> HandlerResult {
        self.mark("☃")
    }

    fn sun(&self, _: &Args) -> HandlerResult {
        self.mark("☼")
    }

    fn moon(&self, _: &Args) -> HandlerResult {
        self.mark("☾")
    }

    /// Symbols whose members ran, in call order.
    pub fn seen(&self) -> Vec<&'static str> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Hitch for Sky {
    fn hitch_method(&self, name: &str) -> Option<HitchFn<Self>> {
        match name {
            "☃" => Some(Self::snowman),
            "☼" => Some(Self::sun),
            "☾" => Some(Self::moon),
            _ => None,
        }
    }
}
