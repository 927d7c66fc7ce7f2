use rand::{rngs::StdRng, Rng, SeedableRng};
use volnet::{
    train_loop, ActivationFunction, LayerDef, LossData, Method, Net, Trainer, TrainerOptions, Vol,
};

fn create_test_trainer(options: TrainerOptions) -> (Trainer, StdRng) {
    let mut rng = StdRng::seed_from_u64(0);
    let layer_defs = [
        LayerDef::input(1, 1, 2),
        LayerDef::fc(5, ActivationFunction::Tanh),
        LayerDef::fc(5, ActivationFunction::Tanh),
        LayerDef::softmax(3),
    ];
    let net = Net::make_layers(&layer_defs, &mut rng).unwrap();
    (Trainer::new(net, options).unwrap(), rng)
}

fn reference_options() -> TrainerOptions {
    TrainerOptions::default()
        .learning_rate(0.0001)
        .momentum(0.0)
        .batch_size(1)
        .l2_decay(0.0)
}

fn random_point(rng: &mut StdRng) -> Vol {
    Vol::from_vec(vec![rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0])
}

#[test]
fn training_increases_ground_truth_probability() {
    // With l1/l2 off and a small step every single update should help.
    let (mut trainer, mut rng) = create_test_trainer(reference_options());

    for _ in 0..100 {
        let mut x = random_point(&mut rng);
        let before = trainer.net().predict(&x);
        let gti = rng.gen_range(0..3);
        trainer.train(&mut x, &LossData::Class(gti)).unwrap();
        let after = trainer.net_mut().forward(&x, false);
        assert!(
            after.w()[gti] > before.w()[gti],
            "class {gti} probability went from {} to {}",
            before.w()[gti],
            after.w()[gti]
        );
    }
}

#[test]
fn input_gradient_matches_finite_differences() {
    // The input gradient depends on every layer's backward pass.
    let (mut trainer, mut rng) = create_test_trainer(reference_options());

    let mut x = random_point(&mut rng);
    let gti = rng.gen_range(0..3);
    let target = LossData::Class(gti);
    trainer.train(&mut x, &target).unwrap();

    let delta = 1e-6;
    for i in 0..x.len() {
        let analytic = x.dw()[i];

        let old = x.w()[i];
        x.w_mut()[i] = old + delta;
        let c0 = trainer.net().cost_loss(&x, &target).unwrap();
        x.w_mut()[i] = old - delta;
        let c1 = trainer.net().cost_loss(&x, &target).unwrap();
        x.w_mut()[i] = old;

        let numeric = (c0 - c1) / (2.0 * delta);
        let rel_error = (analytic - numeric).abs() / (analytic + numeric).abs();
        assert!(rel_error < 1e-2, "{i}: numeric {numeric}, analytic {analytic}, rel error {rel_error}");
    }
}

#[test]
fn every_method_reduces_loss_on_a_fixed_example() {
    for method in [
        Method::Sgd,
        Method::Nesterov,
        Method::Adagrad,
        Method::Windowgrad,
        Method::Adadelta,
        Method::Adam,
    ] {
        let lr = if method == Method::Adadelta { 1.0 } else { 0.01 };
        let options = TrainerOptions::default().method(method).learning_rate(lr).momentum(0.5);
        let (mut trainer, _) = create_test_trainer(options);
        let mut x = Vol::from_vec(vec![0.3, -0.6]);
        let target = LossData::Class(2);

        let first = trainer.net().cost_loss(&x, &target).unwrap();
        for _ in 0..200 {
            trainer.train(&mut x, &target).unwrap();
        }
        let last = trainer.net().cost_loss(&x, &target).unwrap();
        assert!(last < first, "{method:?}: loss {first} -> {last}");
    }
}

#[test]
fn svm_and_regression_nets_train() {
    let mut rng = StdRng::seed_from_u64(5);

    let svm = Net::make_layers(
        &[LayerDef::input(1, 1, 2), LayerDef::fc(4, ActivationFunction::Relu), LayerDef::svm(2)],
        &mut rng,
    )
    .unwrap();
    let mut trainer = Trainer::new(svm, TrainerOptions::default().learning_rate(0.05)).unwrap();
    let mut inputs: Vec<Vol> = (0..20).map(|_| random_point(&mut rng)).collect();
    let targets: Vec<LossData> = inputs.iter().map(|x| LossData::Class(usize::from(x.w()[0] > 0.0))).collect();
    let history = train_loop(&mut trainer, &mut inputs, &targets, 40, &mut rng).unwrap();
    assert!(history[39].mean_loss < history[0].mean_loss);

    let reg = Net::make_layers(
        &[LayerDef::input(1, 1, 1), LayerDef::fc(8, ActivationFunction::Tanh), LayerDef::regression(1)],
        &mut rng,
    )
    .unwrap();
    let mut trainer = Trainer::new(reg, TrainerOptions::default().learning_rate(0.01)).unwrap();
    let mut inputs: Vec<Vol> = (0..20).map(|i| Vol::from_vec(vec![i as f64 / 10.0 - 1.0])).collect();
    let targets: Vec<LossData> = inputs.iter().map(|x| LossData::Target(vec![0.5 * x.w()[0]])).collect();
    let history = train_loop(&mut trainer, &mut inputs, &targets, 60, &mut rng).unwrap();
    assert!(history[59].mean_loss < history[0].mean_loss);
}

#[test]
fn dropout_training_is_reproducible_from_the_seed() {
    let defs = [
        LayerDef::input(1, 1, 2),
        volnet::FcDef::new(8).activation(ActivationFunction::Tanh).drop_prob(0.5).into(),
        LayerDef::softmax(2),
    ];
    let run = || {
        let net = Net::make_layers(&defs, &mut StdRng::seed_from_u64(17)).unwrap();
        let mut trainer = Trainer::new(net, TrainerOptions::default()).unwrap();
        let mut x = Vol::from_vec(vec![0.5, -0.5]);
        for k in 0..10 {
            trainer.train(&mut x, &LossData::Class(k % 2)).unwrap();
        }
        trainer.net().predict(&x).w().to_vec()
    };
    assert_eq!(run(), run());
}
