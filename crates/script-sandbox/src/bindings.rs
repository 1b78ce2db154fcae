//! The capability surface handed to scripts.
//!
//! A script sees exactly two globals: the `Builder` constructor and the
//! `COLORS` table (color name to code). The same two are exported by the
//! `brickyard` module for scripts that `import "brickyard" as b;`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use rhai::module_resolvers::StaticModuleResolver;
use rhai::{Dynamic, Engine, EvalAltResult, ImmutableString, Module, Scope};
use tracing::{debug, info};

use brick_types::{ColorCode, ColorTable, ElementKind, ModelIssue, PartRef};
use model_builder::Builder;

use crate::types::SandboxConfig;
use crate::validate::ALLOWED_MODULE;

type RhaiResult<T> = Result<T, Box<EvalAltResult>>;

/// Message carried by the termination token when the deadline passes.
pub(crate) const DEADLINE_TOKEN: &str = "deadline exceeded";

/// Where `save()` lands during a run.
#[derive(Debug, Default)]
pub(crate) struct SaveSlot {
    pub document: Option<String>,
    pub issues: Vec<ModelIssue>,
    pub saves: usize,
}

/// Script-side handle to a [`Builder`].
///
/// Clones share the same builder, so `b.brick(..).step()` and a later
/// `b.save()` all act on one instance.
#[derive(Clone)]
pub(crate) struct ScriptBuilder {
    inner: Rc<RefCell<Builder>>,
    slot: Rc<RefCell<SaveSlot>>,
}

impl ScriptBuilder {
    fn new(builder: Builder, slot: Rc<RefCell<SaveSlot>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(builder)),
            slot,
        }
    }

    pub fn to_document(&self) -> String {
        self.inner.borrow().to_document()
    }

    pub fn issues(&self) -> Vec<ModelIssue> {
        self.inner.borrow().model().check()
    }

    fn save(&self) {
        let document = self.to_document();
        let mut slot = self.slot.borrow_mut();
        slot.saves += 1;
        slot.issues = self.issues();
        slot.document = Some(document);
    }

    fn with(&mut self, f: impl FnOnce(&mut Builder)) -> Self {
        f(&mut self.inner.borrow_mut());
        self.clone()
    }
}

fn number(value: &Dynamic, what: &str) -> RhaiResult<f64> {
    if let Ok(f) = value.as_float() {
        return Ok(f);
    }
    if let Ok(i) = value.as_int() {
        return Ok(i as f64);
    }
    Err(format!("{what} must be a number, got {}", value.type_name()).into())
}

fn color(value: &Dynamic) -> RhaiResult<ColorCode> {
    let code = value
        .as_int()
        .map_err(|_| format!("color must be an integer, got {}", value.type_name()))?;
    u32::try_from(code)
        .map(ColorCode)
        .map_err(|_| format!("color {code} is out of range").into())
}

fn part(value: &Dynamic) -> RhaiResult<PartRef> {
    let part = if value.is_string() {
        PartRef::new(value.clone().into_string().unwrap_or_default())
    } else if let Ok(i) = value.as_int() {
        PartRef::new(i.to_string())
    } else {
        return Err(format!("part must be a string, got {}", value.type_name()).into());
    };
    if part.is_empty() {
        return Err("part reference must not be empty".into());
    }
    Ok(part)
}

fn xyz(x: &Dynamic, y: &Dynamic, z: &Dynamic) -> RhaiResult<(f64, f64, f64)> {
    Ok((number(x, "x")?, number(y, "y")?, number(z, "z")?))
}

fn colors_map(table: &ColorTable) -> rhai::Map {
    table
        .iter()
        .map(|entry| {
            let key = entry.name.to_ascii_uppercase();
            (key.into(), Dynamic::from_int(entry.code.value() as rhai::INT))
        })
        .collect()
}

/// Register the builder type and its methods.
fn register_builder_api(engine: &mut Engine) {
    engine.register_type_with_name::<ScriptBuilder>("Builder");

    engine
        .register_fn("set_name", |b: &mut ScriptBuilder, name: ImmutableString| {
            b.with(|inner| {
                inner.set_name(name.as_str());
            })
        })
        .register_fn("set_author", |b: &mut ScriptBuilder, author: ImmutableString| {
            b.with(|inner| {
                inner.set_author(author.as_str());
            })
        })
        .register_fn(
            "set_active_color",
            |b: &mut ScriptBuilder, code: Dynamic| -> RhaiResult<ScriptBuilder> {
                let code = color(&code)?;
                Ok(b.with(|inner| {
                    inner.set_active_color(code);
                }))
            },
        )
        .register_fn("active_color", |b: &mut ScriptBuilder| {
            b.inner.borrow().active_color().value() as rhai::INT
        });

    engine.register_fn(
        "place_part",
        |b: &mut ScriptBuilder,
         p: Dynamic,
         c: Dynamic,
         x: Dynamic,
         y: Dynamic,
         z: Dynamic|
         -> RhaiResult<ScriptBuilder> {
            let (p, c, (x, y, z)) = (part(&p)?, color(&c)?, xyz(&x, &y, &z)?);
            Ok(b.with(|inner| {
                inner.place_part(p, c, x, y, z);
            }))
        },
    );
    engine.register_fn(
        "place_part_rotated_y",
        |b: &mut ScriptBuilder,
         p: Dynamic,
         c: Dynamic,
         x: Dynamic,
         y: Dynamic,
         z: Dynamic|
         -> RhaiResult<ScriptBuilder> {
            let (p, c, (x, y, z)) = (part(&p)?, color(&c)?, xyz(&x, &y, &z)?);
            Ok(b.with(|inner| {
                inner.place_part_rotated_y(p, c, x, y, z);
            }))
        },
    );
    engine.register_fn(
        "place_part_rotated_x",
        |b: &mut ScriptBuilder,
         p: Dynamic,
         c: Dynamic,
         x: Dynamic,
         y: Dynamic,
         z: Dynamic|
         -> RhaiResult<ScriptBuilder> {
            let (p, c, (x, y, z)) = (part(&p)?, color(&c)?, xyz(&x, &y, &z)?);
            Ok(b.with(|inner| {
                inner.place_part_rotated_x(p, c, x, y, z);
            }))
        },
    );

    // Sugar: the active color, or an explicit one as the second argument.
    engine
        .register_fn(
            "brick",
            |b: &mut ScriptBuilder, p: Dynamic, x: Dynamic, y: Dynamic, z: Dynamic| {
                let (p, (x, y, z)) = (part(&p)?, xyz(&x, &y, &z)?);
                Ok::<_, Box<EvalAltResult>>(b.with(|inner| {
                    inner.brick(p, x, y, z);
                }))
            },
        )
        .register_fn(
            "plate",
            |b: &mut ScriptBuilder, p: Dynamic, x: Dynamic, y: Dynamic, z: Dynamic| {
                let (p, (x, y, z)) = (part(&p)?, xyz(&x, &y, &z)?);
                Ok::<_, Box<EvalAltResult>>(b.with(|inner| {
                    inner.plate(p, x, y, z);
                }))
            },
        )
        .register_fn(
            "wheel",
            |b: &mut ScriptBuilder, p: Dynamic, x: Dynamic, y: Dynamic, z: Dynamic| {
                let (p, (x, y, z)) = (part(&p)?, xyz(&x, &y, &z)?);
                Ok::<_, Box<EvalAltResult>>(b.with(|inner| {
                    inner.wheel(p, x, y, z);
                }))
            },
        );
    engine
        .register_fn(
            "brick",
            |b: &mut ScriptBuilder,
             p: Dynamic,
             c: Dynamic,
             x: Dynamic,
             y: Dynamic,
             z: Dynamic|
             -> RhaiResult<ScriptBuilder> {
                let (p, c, (x, y, z)) = (part(&p)?, color(&c)?, xyz(&x, &y, &z)?);
                Ok(b.with(|inner| {
                    inner.place_part(p, c, x, y, z);
                }))
            },
        )
        .register_fn(
            "plate",
            |b: &mut ScriptBuilder,
             p: Dynamic,
             c: Dynamic,
             x: Dynamic,
             y: Dynamic,
             z: Dynamic|
             -> RhaiResult<ScriptBuilder> {
                let (p, c, (x, y, z)) = (part(&p)?, color(&c)?, xyz(&x, &y, &z)?);
                Ok(b.with(|inner| {
                    inner.place_part(p, c, x, y, z);
                }))
            },
        )
        // The color argument is accepted and ignored: wheels are black.
        .register_fn(
            "wheel",
            |b: &mut ScriptBuilder,
             p: Dynamic,
             _c: Dynamic,
             x: Dynamic,
             y: Dynamic,
             z: Dynamic|
             -> RhaiResult<ScriptBuilder> {
                let (p, (x, y, z)) = (part(&p)?, xyz(&x, &y, &z)?);
                Ok(b.with(|inner| {
                    inner.wheel(p, x, y, z);
                }))
            },
        );

    engine
        .register_fn("step", |b: &mut ScriptBuilder| {
            b.with(|inner| {
                inner.step();
            })
        })
        .register_fn("clear", |b: &mut ScriptBuilder| {
            b.with(|inner| {
                inner.clear();
            })
        })
        .register_fn("count_parts", |b: &mut ScriptBuilder| {
            b.inner.borrow().element_count(ElementKind::Part) as rhai::INT
        })
        .register_fn("count_steps", |b: &mut ScriptBuilder| {
            b.inner.borrow().element_count(ElementKind::Step) as rhai::INT
        })
        .register_fn("to_document", |b: &mut ScriptBuilder| b.to_document())
        .register_fn("save", |b: &mut ScriptBuilder| b.save());
}

/// Per-run state shared between the engine callbacks and the sandbox.
pub(crate) struct ExecutionContext {
    pub slot: Rc<RefCell<SaveSlot>>,
    pub log: Rc<RefCell<Vec<String>>>,
    colors: rhai::Map,
}

impl ExecutionContext {
    pub fn new(colors: &ColorTable) -> Self {
        Self {
            slot: Rc::new(RefCell::new(SaveSlot::default())),
            log: Rc::new(RefCell::new(Vec::new())),
            colors: colors_map(colors),
        }
    }

    /// A fresh engine holding only this run's capabilities.
    pub fn engine(&self, config: &SandboxConfig, deadline: Instant) -> Engine {
        let mut engine = Engine::new();

        engine.set_max_expr_depths(config.max_expr_depth, config.max_expr_depth);
        engine.set_max_call_levels(config.max_call_levels);
        engine.set_max_operations(config.max_operations.unwrap_or(0));
        engine.set_max_string_size(config.max_string_size);
        engine.set_max_array_size(config.max_array_size);
        engine.set_max_map_size(config.max_map_size);
        engine.disable_symbol("eval");

        let interval = config.progress_check_interval.max(1);
        engine.on_progress(move |ops| {
            if ops % interval == 0 && Instant::now() >= deadline {
                Some(Dynamic::from(DEADLINE_TOKEN))
            } else {
                None
            }
        });

        let max_lines = config.max_log_lines;
        let log = self.log.clone();
        engine.on_print(move |text| {
            info!(target: "script", "{text}");
            let mut log = log.borrow_mut();
            if log.len() < max_lines {
                log.push(text.to_string());
            }
        });
        let log = self.log.clone();
        engine.on_debug(move |text, _source, pos| {
            debug!(target: "script", %pos, "{text}");
            let mut log = log.borrow_mut();
            if log.len() < max_lines {
                log.push(text.to_string());
            }
        });

        register_builder_api(&mut engine);
        self.register_constructors(&mut engine);

        let mut resolver = StaticModuleResolver::new();
        resolver.insert(ALLOWED_MODULE, self.module());
        engine.set_module_resolver(resolver);

        engine
    }

    pub fn scope(&self) -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push_constant("COLORS", self.colors.clone());
        scope
    }

    fn register_constructors(&self, engine: &mut Engine) {
        let slot = self.slot.clone();
        engine.register_fn("Builder", move || {
            ScriptBuilder::new(Builder::default(), slot.clone())
        });
        let slot = self.slot.clone();
        engine.register_fn("Builder", move |name: ImmutableString| {
            ScriptBuilder::new(Builder::new(name.as_str(), ""), slot.clone())
        });
        let slot = self.slot.clone();
        engine.register_fn(
            "Builder",
            move |name: ImmutableString, author: ImmutableString| {
                ScriptBuilder::new(Builder::new(name.as_str(), author.as_str()), slot.clone())
            },
        );
    }

    fn module(&self) -> Module {
        let mut module = Module::new();
        module.set_var("COLORS", self.colors.clone());

        let slot = self.slot.clone();
        module.set_native_fn("Builder", move || {
            Ok(ScriptBuilder::new(Builder::default(), slot.clone()))
        });
        let slot = self.slot.clone();
        module.set_native_fn("Builder", move |name: ImmutableString| {
            Ok(ScriptBuilder::new(Builder::new(name.as_str(), ""), slot.clone()))
        });
        let slot = self.slot.clone();
        module.set_native_fn(
            "Builder",
            move |name: ImmutableString, author: ImmutableString| {
                Ok(ScriptBuilder::new(
                    Builder::new(name.as_str(), author.as_str()),
                    slot.clone(),
                ))
            },
        );
        module
    }
}
