//! Sharing one bound configuration across threads

use envarfig::{ConfigCache, EnvBind, Settings};

#[derive(Debug, Default, Clone, EnvBind)]
struct Config {
    #[env("WORKER_COUNT,default=4")]
    pub worker_count: usize,

    #[env("QUEUE_NAME,default=jobs")]
    pub queue_name: String,
}

fn main() -> anyhow::Result<()> {
    let cache = ConfigCache::new();
    let settings = Settings::default().with_auto_load_env(false);

    std::thread::scope(|scope| -> anyhow::Result<()> {
        let handles: Vec<_> = (0..4)
            .map(|id| {
                let cache = &cache;
                let settings = &settings;
                scope.spawn(move || -> Result<(), envarfig::BindError> {
                    let mut config = Config::default();
                    cache.bind(&mut config, settings)?;
                    println!("thread {id}: {config:?}");
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })?;

    println!("cached records: {}", cache.len());
    Ok(())
}
