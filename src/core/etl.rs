use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load in order. Nothing is written unless
    /// the first two phases succeed.
    pub async fn run(&self) -> Result<String> {
        // Extract
        let table = self.pipeline.extract().await?;
        println!("Original CSV shape: ({}, {})", table.len(), table.headers.len());
        println!("Columns: {:?}", table.headers);
        self.monitor.log_stats("Extract");

        // Transform
        println!("Extracting ISBNs from link column...");
        let result = self.pipeline.transform(table).await?;
        let stats = &result.stats;
        println!(
            "Successfully extracted {} ISBNs out of {} rows",
            stats.matched, stats.total_rows
        );
        println!("Success rate: {:.1}%", stats.match_rate());
        if !stats.samples.is_empty() {
            println!("\nSample extracted ISBNs:");
            for (isbn, link) in &stats.samples {
                println!("  {} <- {}", isbn, link);
            }
        }
        self.monitor.log_stats("Transform");

        // Load
        let shape = (result.table.len(), result.table.headers.len());
        let output_path = self.pipeline.load(result).await?;
        println!("\nSaved to: {}", output_path);
        println!("New CSV shape: ({}, {})", shape.0, shape.1);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
