use flyby::prelude::*;

fn main() -> Result<(), AssetError> {
    env_logger::init();

    let mut engine = SpawnEngine::new(
        Box::new(StaticAssets::standard()),
        RecordingScene::new(),
        SpawnParameters::default(),
    )?;
    engine.reseed(42);

    let mut clock = SessionClock::manual();
    engine.start(clock.now());

    for second in 1..=30 {
        clock.advance(1.0);
        engine.update(clock.now());
        println!(
            "t={:2}s  in flight: {:2}  pending: {}",
            second,
            engine.in_flight(),
            engine.pending_spawns()
        );
    }

    engine.stop();
    clock.advance(30.0);
    engine.update(clock.now());
    println!("drained, {} scene commands issued", engine.scene().commands().len());
    Ok(())
}
