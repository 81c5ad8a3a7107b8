use anyhow::Context;
use bookshelf::books;
use bookshelf_kernel::settings::Settings;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        catalog = %settings.catalog.path.display(),
        "bookshelf bootstrap starting"
    );

    let catalog = &settings.catalog.path;
    let books = books::load_catalog(catalog)
        .with_context(|| format!("failed to load catalog '{}'", catalog.display()))?;

    for book in &books {
        println!("{book}");
    }

    let Some(first) = books.first() else {
        tracing::warn!("catalog is empty; nothing more to show");
        return Ok(());
    };
    println!("{first}");
    println!(
        "{}",
        serde_json::Value::Object(first.snapshot_excluding(&["price"]))
    );

    match books.get(1) {
        Some(second) => println!("{}", second.copy()),
        None => tracing::warn!("catalog has a single record; skipping copy"),
    }

    tracing::info!(count = books.len(), "bookshelf bootstrap complete");
    Ok(())
}
