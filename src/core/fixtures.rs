//! Test records shared by the core unit tests

use crate::types::{Record, Value};
use std::sync::Arc;

pub struct Manufacturer {
    pub name: String,
    pub car_count: usize,
}

impl Manufacturer {
    pub fn new(name: &str, car_count: usize) -> Self {
        Self {
            name: name.to_string(),
            car_count,
        }
    }
}

impl Record for Manufacturer {
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.clone())),
            "car_set" => Some(Value::record(CarSet(self.car_count))),
            _ => None,
        }
    }

    fn display(&self) -> String {
        self.name.clone()
    }
}

/// Related-object manager exposing a `count()` method
pub struct CarSet(usize);

impl Record for CarSet {
    fn attr(&self, name: &str) -> Option<Value> {
        let count = self.0;
        match name {
            "count" => Some(Value::method(move || Value::from(count))),
            _ => None,
        }
    }
}

pub struct Car {
    pub name: String,
    pub manufacturer: Arc<Manufacturer>,
    pub electric: bool,
    pub body_style: &'static str,
}

impl Car {
    pub fn new(name: &str, manufacturer: Arc<Manufacturer>) -> Self {
        Self {
            name: name.to_string(),
            manufacturer,
            electric: false,
            body_style: "suv",
        }
    }

    pub fn grand_cherokee() -> Self {
        Self::new("Grand Cherokee", Arc::new(Manufacturer::new("Jeep", 1)))
    }
}

impl Record for Car {
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.clone())),
            "manufacturer" => Some(Value::from(Arc::clone(&self.manufacturer))),
            "is_electric" => Some(Value::from(self.electric)),
            "display_name" => Some(Value::from(self.name.to_uppercase())),
            "get_display_name" => {
                let upper = self.name.to_uppercase();
                Some(Value::method(move || Value::from(upper.clone())))
            }
            "get_body_style_display" => {
                let display = match self.body_style {
                    "suv" => "Sport utility",
                    "sedan" => "Sedan",
                    other => other,
                };
                Some(Value::method(move || Value::from(display)))
            }
            _ => None,
        }
    }

    fn display(&self) -> String {
        self.name.clone()
    }
}
