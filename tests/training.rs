use micronet::{
  Arena, Dataset, Error, ForwardDifference, Layout, Mat, Net, Sigmoid, TrainConfig, Trainer,
};
use rand::{ Rng, SeedableRng, rngs::StdRng };


fn gate(outputs: [f64; 4]) -> Dataset<f64> {
  Dataset::from_rows(2, 1, &[
    [0.0, 0.0, outputs[0]],
    [0.0, 1.0, outputs[1]],
    [1.0, 0.0, outputs[2]],
    [1.0, 1.0, outputs[3]],
  ]).unwrap()
}

fn train(data: &Dataset<f64>, seed: u64) -> Net<f64> {
  let (inputs, targets) = data.split();
  let layout = Layout::new(2, &[1]).unwrap();
  let arena = Arena::new(&layout).unwrap();
  let mut net = Net::carve(&layout, &arena.params, &arena.acts).unwrap();
  net.randomize(&mut StdRng::seed_from_u64(seed), 0.0, 1.0);

  let config = TrainConfig { rate: 0.1, eps: 0.1, iterations: 2000, sample_every: 100 };
  let history = Trainer::new(config, ForwardDifference).unwrap()
    .fit(&mut net, &inputs, &targets, &Sigmoid).unwrap();
  assert_eq!(history.checkpoints().len(), 21);
  assert!(history.decreasing_ratio() >= 0.9, "{:?}", history);
  assert!(history.last().unwrap() < history.initial().unwrap());
  net
}

fn predict(net: &mut Net<f64>, a: f64, b: f64) -> f64 {
  net.forward(&Mat::vec(&[a, b]), &Sigmoid).unwrap().at(0, 0)
}

#[test]
fn learns_and() {
  for seed in 0..3 {
    let mut net = train(&gate([0.0, 0.0, 0.0, 1.0]), seed);
    assert!(predict(&mut net, 1.0, 1.0) > 0.5);
    assert!(predict(&mut net, 0.0, 0.0) < 0.5);
    assert!(predict(&mut net, 0.0, 1.0) < 0.5);
    assert!(predict(&mut net, 1.0, 0.0) < 0.5);
  }
}

#[test]
fn learns_or() {
  let mut net = train(&gate([0.0, 1.0, 1.0, 1.0]), 42);
  assert!(predict(&mut net, 0.0, 0.0) < 0.5);
  assert!(predict(&mut net, 0.0, 1.0) > 0.5);
  assert!(predict(&mut net, 1.0, 0.0) > 0.5);
  assert!(predict(&mut net, 1.0, 1.0) > 0.5);
}

#[test]
fn trains_from_parsed_dataset() {
  let data = Dataset::<f64>::parse(include_str!("../demos/data/and.txt")).unwrap();
  let mut net = train(&data, 7);
  assert!(predict(&mut net, 1.0, 1.0) > 0.5);
  assert!(predict(&mut net, 0.0, 0.0) < 0.5);
}

#[test]
fn arena_views_never_alias() {
  let mut rng = StdRng::seed_from_u64(1234);
  for _ in 0..50 {
    let input = rng.gen_range(1, 8);
    let widths: Vec<usize> = (0..rng.gen_range(1, 6)).map(|_| rng.gen_range(1, 8) ).collect();
    let layout = Layout::new(input, &widths).unwrap();
    let arena = Arena::<f64>::new(&layout).unwrap();
    let net = Net::carve(&layout, &arena.params, &arena.acts).unwrap();

    // Tag every element through its own view, then read all tags back
    let mut tag = 0.0;
    for view in net.views() {
      for i in 0..view.rows() {
        for j in 0..view.cols() {
          tag += 1.0;
          view.set(i, j, tag);
        }
      }
    }
    let mut tag = 0.0;
    for view in net.views() {
      for value in view.iter() {
        tag += 1.0;
        assert_eq!(value, tag);
      }
    }

    // Together the views cover both arenas exactly
    let covered: usize = net.views().map(|v| v.size() ).sum();
    assert_eq!(covered, arena.params.size() + arena.acts.size());
    assert!(arena.params.iter().chain(arena.acts.iter()).all(|v| v != 0.0 ));
  }
}

#[test]
fn gradient_must_not_share_the_network() {
  let data = gate([0.0, 0.0, 0.0, 1.0]);
  let (inputs, targets) = data.split();
  let layout = Layout::new(2, &[1]).unwrap();
  let arena = Arena::<f64>::new(&layout).unwrap();
  let mut net = Net::carve(&layout, &arena.params, &arena.acts).unwrap();
  let mut shadow = Net::carve(&layout, &arena.params, &arena.acts).unwrap();
  let result = micronet::estimate_gradient(&mut shadow, &mut net, &inputs, &targets, &Sigmoid, 0.1);
  assert!(matches!(result, Err(Error::Aliasing { .. })));
}
