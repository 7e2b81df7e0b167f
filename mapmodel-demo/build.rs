use config::Config;

fn main() {
    let settings = Config::builder()
        .add_source(config::File::with_name("../Settings"))
        .add_source(config::Environment::with_prefix("MAPMODEL"))
        .build()
        .unwrap();

    println!(
        "cargo::rustc-env=MAPMODEL_asset_base_url={}",
        settings.get_string("asset_base_url").unwrap()
    );
}
