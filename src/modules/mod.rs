pub mod books;

use catalog_db::Database;
use catalog_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) -> anyhow::Result<()> {
    registry.register(books::create_module(db.pool().clone()))?;
    Ok(())
}
