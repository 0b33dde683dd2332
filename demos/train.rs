use std::process::exit;
use std::str::FromStr;

use micronet::{ Dataset, Layout, Net, Sigmoid, TrainConfig, Trainer, ForwardDifference };

const USAGE: &str = "Usage: train <data> <debug> <rate> <eps> <iter>";

fn arg<T: FromStr>(args: &[String], i: usize, code: i32) -> T {
  args[i].parse().unwrap_or_else(|_| {
    eprintln!("Error: argument {} invalid", args[i]);
    exit(code)
  })
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let args: Vec<String> = std::env::args().collect();
  if args.len() != 6 {
    eprintln!("{USAGE}");
    exit(1)
  }

  let data = Dataset::<f64>::load(&args[1]).unwrap_or_else(|e| {
    eprintln!("Error: loading from file {}: {}", args[1], e);
    exit(2)
  });
  let config = TrainConfig {
    sample_every: arg(&args, 2, 3),
    rate: arg(&args, 3, 4),
    eps: arg(&args, 4, 5),
    iterations: arg(&args, 5, 6),
  };

  if let Err(e) = run(&data, config) {
    eprintln!("Error: {e}");
    exit(7)
  }
}

fn run(data: &Dataset<f64>, config: TrainConfig<f64>) -> micronet::Result<()> {
  let (inputs, targets) = data.split();

  // Hidden layer of two neurons feeding the outputs
  let layout = Layout::new(inputs.cols(), &[2, targets.cols()])?;
  let mut net = Net::arena(&layout)?;
  net.randomize(&mut rand::thread_rng(), 0.0, 1.0);

  Trainer::new(config, ForwardDifference)?.fit(&mut net, &inputs, &targets, &Sigmoid)?;

  for (sample, expected) in inputs.row_iter().zip(targets.row_iter()) {
    let result = net.forward(&sample, &Sigmoid)?;
    print!("{:.6}", sample.named("inputs"));
    print!("{:.6}", result.named("result"));
    print!("{:.6}", expected.named("expected"));
  }
  Ok(())
}
