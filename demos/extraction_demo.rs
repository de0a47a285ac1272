use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    featurekit::example_apps::run_extraction_demo(std::env::args().skip(1))
}
