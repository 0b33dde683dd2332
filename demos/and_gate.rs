use micronet::{ Arena, Layout, Mat, Net, Sigmoid, finite_diff::estimate_gradient };
use rand::{ SeedableRng, rngs::StdRng };

fn main() -> micronet::Result<()> {
  env_logger::init();

  // Inputs and expected outputs of a logical AND
  let inputs = Mat::new(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0])?;
  let targets = Mat::new(4, 1, vec![0.0, 0.0, 0.0, 1.0])?;

  // Single neuron, carved from two flat buffers
  let layout = Layout::new(2, &[1])?;
  let arena = Arena::<f64>::new(&layout)?;
  let mut net = Net::carve(&layout, &arena.params, &arena.acts)?;
  net.randomize(&mut StdRng::seed_from_u64(0), 0.0, 1.0);

  // Gradient storage of the same shape
  let mut grad = Net::alloc(&layout)?;

  // Basic gradient descent
  for i in 0..=2000 {
    if i % 250 == 0 {
      println!("[{:8}]cost: {:20.10}", i, net.cost(&inputs, &targets, &Sigmoid)?);
    }
    estimate_gradient(&mut grad, &mut net, &inputs, &targets, &Sigmoid, 0.1)?;
    net.learn(&grad, 0.1)?;
  }

  print!("{:.6}", net.named("and"));
  for sample in inputs.row_iter() {
    let out = net.forward(&sample, &Sigmoid)?;
    println!("{} -> {}", itertools::join(sample.iter(), " & "), out.at(0, 0));
  }
  Ok(())
}
