use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use yangsmith_generate::{generate_all, GenerationContext, OutputNode, TreeBackend};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut model_path: Option<PathBuf> = None;
    let mut seed: u64 = 0;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => model_path = args.next().map(PathBuf::from),
            "--seed" => seed = args.next().map(|s| s.parse()).transpose()?.unwrap_or(0),
            _ => {
                if model_path.is_none() {
                    model_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let model_path = model_path.ok_or("missing --model path")?;
    let tree = yangsmith_core::load_path(&model_path)?;

    let mut ctx = GenerationContext::new(&tree, seed);
    let mut root = OutputNode::root("data");
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut root);
        generate_all(&mut ctx, &mut backend)?;
    }

    println!("{}", serde_json::to_string_pretty(&root)?);
    Ok(())
}
