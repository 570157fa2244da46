#![allow(clippy::print_stdout)]

use packline::{Bundler, BundlerOptions, ModuleRecord};

#[tokio::main]
async fn main() {
  env_logger::init();

  let mut bundler = Bundler::new(BundlerOptions {
    entries: Some(vec!["./entry.js".into()]),
    modules: Some(vec![
      ModuleRecord::new("./entry.js", "console.log(require('./greet')('world'));")
        .dep("./greet"),
      ModuleRecord::new(
        "./greet.js",
        "module.exports = function (name) { return 'hello ' + name; };",
      ),
    ]),
    ..Default::default()
  });

  match bundler.bundle().await {
    Ok(artifact) => println!("{}", String::from_utf8_lossy(&artifact)),
    Err(error) => eprintln!("{error}"),
  }
}
