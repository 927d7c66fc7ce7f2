use rand::{rngs::StdRng, Rng, SeedableRng};
use volnet::{
    train_loop, ActivationFunction, FcDef, LayerDef, LossData, Method, Net, Trainer,
    TrainerOptions, Vol,
};

/// Classifies points of the square [-1, 1]² as inside or outside the circle of
/// radius 0.6.
fn main() -> volnet::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);

    let mut inputs = Vec::new();
    let mut targets = Vec::new();
    for _ in 0..200 {
        let (a, b): (f64, f64) = (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        inputs.push(Vol::from_vec(vec![a, b]));
        targets.push(LossData::Class(usize::from(a * a + b * b < 0.36)));
    }

    let net = Net::make_layers(
        &[
            LayerDef::input(1, 1, 2),
            FcDef::new(12).activation(ActivationFunction::Relu).into(),
            LayerDef::fc(6, ActivationFunction::Maxout { group_size: 2 }),
            LayerDef::softmax(2),
        ],
        &mut rng,
    )?;
    println!("{} layers, {} parameters", net.layers().len(), net.param_count());

    let options = TrainerOptions::default()
        .method(Method::Adam)
        .learning_rate(0.01)
        .batch_size(10)
        .l2_decay(0.001);
    let mut trainer = Trainer::new(net, options)?;

    let history = train_loop(&mut trainer, &mut inputs, &targets, 100, &mut rng)?;
    for stats in history.iter().step_by(10) {
        println!(
            "Epoch {}/{}: loss = {:.4}, accuracy = {:.1}%",
            stats.epoch,
            stats.total_epochs,
            stats.mean_loss,
            stats.accuracy.unwrap_or(0.0) * 100.0
        );
    }

    for p in [[0.0, 0.0], [0.5, 0.0], [0.9, 0.9]] {
        let class = trainer.net().predict_class(&Vol::from_vec(p.to_vec()));
        println!("{:?} -> {}", p, if class == 1 { "inside" } else { "outside" });
    }
    Ok(())
}
