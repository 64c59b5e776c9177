//! Object graphs shared by the scenario tests.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{describe_object, Object, ObjectRef, ToValue, TypeDescriptor, Value};

pub struct Customer {
    pub name: String,
    pub age: u32,
    pub password: String,
}

describe_object!(Customer {
    pub name: String,
    pub age: u32,
    pub password: String,
});

pub fn customer(name: &str, age: u32, password: &str) -> Arc<Customer> {
    Arc::new(Customer {
        name: name.to_string(),
        age,
        password: password.to_string(),
    })
}

pub struct OrderLine {
    pub product: String,
    pub quantity: u32,
}

describe_object!(OrderLine {
    pub product: String,
    pub quantity: u32,
});

pub fn line(product: &str, quantity: u32) -> Arc<OrderLine> {
    Arc::new(OrderLine {
        product: product.to_string(),
        quantity,
    })
}

pub struct Order {
    pub id: u64,
    pub customer: Arc<Customer>,
    pub lines: Vec<Arc<OrderLine>>,
}

describe_object!(Order {
    pub id: u64,
    pub customer: Arc<Customer>,
    pub lines: Vec<Arc<OrderLine>>,
});

/// Singly linked node; `next` can point back to an ancestor.
pub struct Node {
    pub name: String,
    pub next: RwLock<Option<Arc<Node>>>,
}

describe_object!(Node {
    pub name: String,
    pub next: RwLock<Option<Arc<Node>>>,
});

pub fn node(name: &str) -> Arc<Node> {
    Arc::new(Node {
        name: name.to_string(),
        next: RwLock::new(None),
    })
}

pub fn link(from: &Arc<Node>, to: &Arc<Node>) {
    *from.next.write() = Some(Arc::clone(to));
}

pub fn self_loop(name: &str) -> Arc<Node> {
    let node = node(name);
    link(&node, &node);
    node
}

/// Two members that may share one customer.
pub struct Pair {
    pub left: Arc<Customer>,
    pub right: Arc<Customer>,
}

describe_object!(Pair {
    pub left: Arc<Customer>,
    pub right: Arc<Customer>,
});

pub struct ClassA {
    pub a: i32,
    pub b: i32,
}

describe_object!(ClassA { pub a: i32, pub b: i32 });

pub struct ClassB {
    pub a: i32,
}

describe_object!(ClassB { pub a: i32 });

pub struct Measurement {
    pub label: String,
    pub value: f64,
}

describe_object!(Measurement {
    pub label: String,
    pub value: f64,
});

pub fn measurement(label: &str, value: f64) -> Arc<Measurement> {
    Arc::new(Measurement {
        label: label.to_string(),
        value,
    })
}

pub struct Account {
    pub login: String,
    secret: String,
}

describe_object!(Account {
    pub login: String,
    secret: String,
});

pub fn account(login: &str, secret: &str) -> Arc<Account> {
    Arc::new(Account {
        login: login.to_string(),
        secret: secret.to_string(),
    })
}

/// Exposes only `area` through its declared type.
pub trait Shape: Object {
    fn area(&self) -> f64;
}

pub struct Circle {
    pub area: f64,
    pub radius: f64,
}

describe_object!(Circle {
    pub area: f64,
    pub radius: f64,
});

impl Shape for Circle {
    fn area(&self) -> f64 {
        self.area
    }
}

/// Holds a circle through a field declared as `dyn Shape`.
pub struct Holder {
    pub shape: Arc<Circle>,
}

impl Object for Holder {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Holder>().member::<dyn Shape>("shape")
    }

    fn get(&self, member: &str) -> Option<Value> {
        match member {
            "shape" => {
                let declared = TypeDescriptor::of::<dyn Shape>().member::<f64>("area");
                let shape = ObjectRef::new(self.shape.clone()).declared_as(declared);
                Some(Value::Object(shape))
            }
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn holder(area: f64, radius: f64) -> Arc<Holder> {
    Arc::new(Holder {
        shape: Arc::new(Circle { area, radius }),
    })
}

/// A getter that panics.
pub struct Exploding;

impl Object for Exploding {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Exploding>().member::<i32>("value")
    }

    fn get(&self, _member: &str) -> Option<Value> {
        panic!("getter exploded")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Lists a member it cannot read.
pub struct Ghost;

impl Object for Ghost {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Ghost>().member::<i32>("ghost")
    }

    fn get(&self, _member: &str) -> Option<Value> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Inactive,
}

impl ToValue for Status {
    fn to_value(&self) -> Value {
        match self {
            Status::Active => Value::variant::<Status>("Active"),
            Status::Inactive => Value::variant::<Status>("Inactive"),
        }
    }
}
