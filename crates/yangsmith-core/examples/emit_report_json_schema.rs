use schemars::schema_for;
use yangsmith_core::ComplexityReport;

fn main() {
    let schema = schema_for!(ComplexityReport);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
