use rand::{rngs::StdRng, SeedableRng};
use volnet::{ActivationFunction, LayerDef, LossData, Net, Trainer, TrainerOptions, Vol};

fn main() -> volnet::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let net = Net::make_layers(
        &[
            LayerDef::input(1, 1, 2),
            LayerDef::fc(4, ActivationFunction::Tanh),
            LayerDef::softmax(2),
        ],
        &mut rng,
    )?;
    let mut trainer = Trainer::new(net, TrainerOptions::default().learning_rate(0.1))?;

    let mut inputs = vec![
        Vol::from_vec(vec![1.0, 0.0]),
        Vol::from_vec(vec![1.0, 1.0]),
        Vol::from_vec(vec![0.0, 1.0]),
        Vol::from_vec(vec![0.0, 0.0]),
    ];
    let labels = [1, 0, 1, 0];

    let epochs = 2000;
    for epoch in 0..epochs {
        let mut loss = 0.0;
        for (x, &label) in inputs.iter_mut().zip(&labels) {
            loss += trainer.train(x, &LossData::Class(label))?.loss;
        }
        if epoch % 200 == 0 {
            println!("Epoch {epoch}: loss = {:.6}", loss / inputs.len() as f64);
        }
    }

    for x in &inputs {
        let probs = trainer.net().predict(x);
        println!("Input: {:?} -> P(1) = {:.4}", x.w(), probs.w()[1]);
    }
    Ok(())
}
