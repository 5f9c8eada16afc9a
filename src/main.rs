/// Native driver: loads a feed from disk and prints one catalog page.
///
/// Usage: `storefront-native [FEED] [--search TEXT] [--sort name|price-asc|price-desc]
/// [--min N] [--max N] [--page N] [--add ID]...`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;

    use storefront::config::AppConfig;
    use storefront::feed::read_feed_file;
    use storefront::model::format_amount;
    use storefront::storage::{CartStore, FileCartStore, MemoryCartStore};
    use storefront::StorefrontApp;

    let config = AppConfig::load_or_default();
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let args = Args::parse();

    let store: Box<dyn CartStore> = match FileCartStore::in_config_dir() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("No config directory, cart will not be saved");
            Box::new(MemoryCartStore::new())
        }
    };

    let feed_path = args
        .feed
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.feed.json_file));
    let currency = config.catalog.currency.clone();
    let mut app = StorefrontApp::new(config, store);

    if let Err(e) = app.load_feed(read_feed_file(&feed_path)) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let catalog = app.catalog_mut();
    if let Some(query) = &args.search {
        catalog.set_search_query(query.as_str());
    }
    if let Some(sort) = args.sort {
        catalog.set_sort_by(sort);
    }
    if let Some(min) = args.min_price {
        catalog.set_price_min(min);
    }
    if let Some(max) = args.max_price {
        catalog.set_price_max(max);
    }
    if let Some(page) = args.page {
        catalog.go_to_page(page);
    }
    for id in &args.add {
        if !catalog.add_to_cart(*id) {
            log::warn!("No product with id {}", id);
        }
    }

    let catalog = app.catalog();
    println!(
        "{} products, page {}/{}",
        catalog.filtered_count(),
        catalog.current_page(),
        catalog.total_pages()
    );
    for product in catalog.displayed_products() {
        println!(
            "  [{:>4}] {:<40} {} {}",
            product.id,
            product.title,
            format_amount(product.price),
            currency
        );
    }

    let window = app.page_window();
    if !window.is_empty() {
        let pages: Vec<String> = window
            .pages
            .iter()
            .map(|&p| {
                if p == window.current {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!("Pages: {}", pages.join(" "));
    }

    let (lines, total) = app.order_summary();
    if !lines.is_empty() {
        println!("Cart:");
        for line in &lines {
            println!(
                "  {} x{} = {} {}",
                line.title,
                line.quantity,
                format_amount(line.subtotal),
                currency
            );
        }
        println!("  Total: {} {}", format_amount(total), currency);
    }

    ExitCode::SUCCESS
}

/// Command line options for the native driver.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, clap::Parser)]
#[command(
    name = "storefront-native",
    about = "Load a product feed and print one catalog page",
    version
)]
struct Args {
    /// Feed JSON file; defaults to the configured feed
    feed: Option<std::path::PathBuf>,

    #[arg(long)]
    search: Option<String>,

    /// name, price-asc or price-desc
    #[arg(long)]
    sort: Option<storefront::SortKey>,

    #[arg(long = "min")]
    min_price: Option<u32>,

    #[arg(long = "max")]
    max_price: Option<u32>,

    #[arg(long)]
    page: Option<usize>,

    /// Product id to add to the cart; repeatable
    #[arg(long)]
    add: Vec<storefront::ProductId>,
}


// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
