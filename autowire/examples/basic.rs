//! Basic example of the Autowire container.

use autowire::prelude::*;
use std::sync::Arc;

// === Define your types ===

struct ConsoleLogger;

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Database {
    url: String,
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: i64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<ConsoleLogger>,
}

impl UserService {
    fn get_user(&self, id: i64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

fn catalog() -> TypeCatalog {
    let types = TypeCatalog::new();
    types
        .declare(TypeInfo::interface("LoggerInterface"))
        .declare(
            TypeInfo::concrete("ConsoleLogger")
                .implements("LoggerInterface")
                .bare(|| ConsoleLogger),
        )
        .declare(TypeInfo::concrete("Database").constructor(
            vec![
                Parameter::builtin("url").or("sqlite::memory:"),
                Parameter::typed("logger", "LoggerInterface"),
            ],
            |args| {
                Ok(Database {
                    url: args.str("url")?.to_string(),
                    logger: args.object::<ConsoleLogger>("logger")?,
                })
            },
        ))
        .declare(TypeInfo::concrete("UserRepository").constructor(
            vec![Parameter::typed("db", "Database")],
            |args| Ok(UserRepository { db: args.object::<Database>("db")? }),
        ))
        .declare(
            TypeInfo::concrete("UserService")
                .constructor(
                    vec![
                        Parameter::typed("repo", "UserRepository"),
                        Parameter::typed("logger", "LoggerInterface"),
                    ],
                    |args| {
                        Ok(UserService {
                            repo: args.object::<UserRepository>("repo")?,
                            logger: args.object::<ConsoleLogger>("logger")?,
                        })
                    },
                )
                .method::<UserService>("show", vec![Parameter::builtin("id")], |service, args| {
                    Ok(Value::from(service.get_user(args.int("id")?)))
                }),
        );
    types
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("autowire_container=debug")
        .init();

    let container = Container::builder()
        .types(Arc::new(catalog()))
        .provider(|c: &Container| {
            // One logger for everyone
            c.set_instance("LoggerInterface", Object::new("ConsoleLogger", ConsoleLogger))
        })
        .build()?;

    // UserService -> UserRepository -> Database -> LoggerInterface, all auto-wired
    let service = container.get_as::<UserService>("UserService")?;
    println!("{}", service.get_user(42));

    // Constructor arguments can be overridden by name
    let db = container.get_with("Database", &Overrides::new().with("url", "postgres://localhost/app"))?;
    if let Some(db) = db.downcast::<Database>() {
        println!("{}", db.query("SELECT 1"));
    }

    // Methods are invoked with auto-wired receivers and arguments
    let shown = container.invoke_with("UserService::show", &Overrides::new().with("id", 7), None)?;
    println!("{shown:?}");

    Ok(())
}
