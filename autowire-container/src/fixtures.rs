//! Types shared by the unit tests.

use std::sync::Arc;

use crate::catalog::{TypeCatalog, TypeInfo};
use crate::reflect::{Function, Parameter};
use crate::value::{Object, Value};

#[derive(Debug)]
pub struct SimpleClass;

#[derive(Debug)]
pub struct Engine {
    pub cylinders: u32,
}

#[derive(Debug)]
pub struct Car {
    pub engine: Arc<Engine>,
}

#[derive(Debug)]
pub struct Garage {
    pub left: Arc<Car>,
    pub right: Arc<Car>,
}

#[derive(Debug)]
pub struct StaticFactoryClass;

#[derive(Debug)]
pub struct FactoryInstanceClass {
    pub id: i64,
}

#[derive(Debug)]
pub struct InvokableClass;

#[derive(Debug)]
pub struct BuildInParameterClass {
    pub foo: String,
    /// The argument exactly as passed
    pub raw: Value,
}

#[derive(Debug)]
pub struct BuildInParameterHolder;

#[derive(Debug)]
pub struct CircularDependencyAClass;

#[derive(Debug)]
pub struct CircularDependencyBClass;

fn simple() -> Value {
    Value::from(Object::new("SimpleClass", SimpleClass))
}

pub fn catalog() -> TypeCatalog {
    let types = TypeCatalog::new();
    types
        .declare(TypeInfo::interface("SimpleClassInterface"))
        .declare(
            TypeInfo::concrete("SimpleClass")
                .implements("SimpleClassInterface")
                .bare(|| SimpleClass),
        )
        .declare(TypeInfo::concrete("Engine").bare(|| Engine { cylinders: 4 }))
        .declare(
            TypeInfo::concrete("Car").constructor(vec![Parameter::typed("engine", "Engine")], |args| {
                Ok(Car {
                    engine: args.object::<Engine>("engine")?,
                })
            }),
        )
        .declare(TypeInfo::concrete("Garage").constructor(
            vec![Parameter::typed("left", "Car"), Parameter::typed("right", "Car")],
            |args| {
                Ok(Garage {
                    left: args.object::<Car>("left")?,
                    right: args.object::<Car>("right")?,
                })
            },
        ))
        .declare(
            TypeInfo::concrete("StaticFactoryClass")
                .bare(|| StaticFactoryClass)
                .static_method("build", vec![], |_| Ok(simple()))
                .static_method(
                    "resolveClassname",
                    vec![Parameter::typed("obj", "SimpleClass")],
                    |args| Ok(args.value("obj")?.clone()),
                )
                .static_method(
                    "resolveOptionalParameter",
                    vec![Parameter::builtin("string").or("")],
                    |args| Ok(Value::record([("value", args.str("string")?)])),
                ),
        )
        .declare(
            TypeInfo::concrete("FactoryInstanceClass")
                .bare(|| FactoryInstanceClass { id: 0 })
                .method::<FactoryInstanceClass>("build", vec![], |_, _| Ok(simple()))
                .method::<FactoryInstanceClass>(
                    "resolveClassname",
                    vec![Parameter::typed("obj", "SimpleClass")],
                    |_, args| Ok(args.value("obj")?.clone()),
                )
                .method::<FactoryInstanceClass>(
                    "resolveOptionalParameter",
                    vec![Parameter::builtin("string").or("")],
                    |_, args| Ok(Value::record([("value", args.str("string")?)])),
                )
                .method::<FactoryInstanceClass>("whoami", vec![], |this, _| Ok(Value::from(this.id))),
        )
        .declare(
            TypeInfo::concrete("InvokableClass")
                .bare(|| InvokableClass)
                .method::<InvokableClass>("invoke", vec![], |_, _| Ok(simple())),
        )
        .declare(
            TypeInfo::concrete("BuildInParameterClass").constructor(
                vec![Parameter::builtin("foo")],
                |args| {
                    let raw = args.value("foo")?.clone();
                    Ok(BuildInParameterClass {
                        foo: raw.as_str().map(str::to_string).unwrap_or_default(),
                        raw,
                    })
                },
            ),
        )
        .declare(TypeInfo::concrete("BuildInParameterHolder").constructor(
            vec![
                Parameter::typed("dep", "SimpleClassInterface"),
                Parameter::builtin("foo"),
            ],
            |_| Ok(BuildInParameterHolder),
        ))
        .declare(TypeInfo::concrete("CircularDependencyAClass").constructor(
            vec![Parameter::typed("b", "CircularDependencyBClass")],
            |_| Ok(CircularDependencyAClass),
        ))
        .declare(TypeInfo::concrete("CircularDependencyBClass").constructor(
            vec![Parameter::typed("a", "CircularDependencyAClass")],
            |_| Ok(CircularDependencyBClass),
        ))
        .declare_function(Function::new("trim", vec![Parameter::builtin("str")], |args| {
            Ok(Value::from(args.str("str")?.trim()))
        }));
    types
}
