use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use warden::{Container, ContainerError};

// A minimal service graph: configuration -> database -> user service.

struct AppConfig {
  database_url: String,
}

struct Database {
  url: String,
}

struct UserService {
  db: Arc<Database>,
}

impl UserService {
  fn describe_user(&self) -> String {
    format!("user loaded from {}", self.db.url)
  }
}

// A global, thread-safe counter to show how transient lifetimes behave.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct RequestId {
  id: usize,
}

fn main() -> Result<(), ContainerError> {
  let container = Container::new();

  // --- Registration ---
  container.register_instance("config", AppConfig {
    database_url: "postgres://localhost/app".to_string(),
  })?;

  container.register_singleton("database", |c: &Container| {
    println!("Creating the Database (you will only see this once)...");
    let config = c.resolve::<AppConfig>("config")?;
    Ok(Database {
      url: config.database_url.clone(),
    })
  })?;

  container.register_singleton("user_service", |c: &Container| {
    Ok(UserService {
      db: c.resolve::<Database>("database")?,
    })
  })?;

  container.register_transient("request_id", |_| {
    Ok(RequestId {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  })?;

  // --- Resolution ---
  println!("--- Resolving the singleton graph ---");
  let users = container.resolve::<UserService>("user_service")?;
  println!("{}", users.describe_user());

  let db1 = container.resolve::<Database>("database")?;
  let db2 = container.resolve::<Database>("database")?;
  assert!(
    Arc::ptr_eq(&db1, &db2),
    "singleton instances should be identical"
  );
  println!("Both database resolutions share one instance, as expected.\n");

  println!("--- Resolving transients ---");
  let r1 = container.resolve::<RequestId>("request_id")?;
  let r2 = container.resolve::<RequestId>("request_id")?;
  println!("Request id 1: {}, request id 2: {}", r1.id, r2.id);
  assert!(
    !Arc::ptr_eq(&r1, &r2),
    "transient instances should be different"
  );

  container.dispose();
  println!("\nContainer disposed; further resolutions now fail.");
  assert!(container.resolve::<Database>("database").is_err());

  Ok(())
}
