use std::env;

use anyhow::bail;
use rh_task::task_runner::TaskRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("no task config provided in args, usage: rh-main <task_config.ini>");
    }

    let runner = TaskRunner::new(&args[1])?;
    runner.start_task().await
}
