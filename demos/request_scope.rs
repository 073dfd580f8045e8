use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use warden::{Container, ContainerError, Dispose, Lifetime};

// One scoped "request context" per unit of work, released between requests.

static CONTEXT_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct RequestContext {
  id: usize,
}

impl Dispose for RequestContext {
  fn dispose(&self) -> Result<(), warden::BoxError> {
    println!("Releasing request context #{}", self.id);
    Ok(())
  }
}

fn handle_request(container: &Container) -> Result<(), ContainerError> {
  // Every resolution within one request sees the same context.
  let first = container.resolve::<RequestContext>("request_context")?;
  let second = container.resolve::<RequestContext>("request_context")?;
  assert!(Arc::ptr_eq(&first, &second));
  println!("Handled request with context #{}", first.id);
  Ok(())
}

fn main() -> Result<(), ContainerError> {
  let container = Container::new();

  container.register_disposable("request_context", Lifetime::Scoped, |_| {
    let id = CONTEXT_COUNTER.fetch_add(1, Ordering::SeqCst);
    println!("Creating request context #{id}");
    Ok(RequestContext { id })
  })?;

  // Simulate two requests with a scope clear in between; each request gets
  // its own context and the old one is released.
  handle_request(&container)?;
  container.clear_scope();

  handle_request(&container)?;
  container.clear_scope();

  container.dispose();
  println!("Done.");
  Ok(())
}
