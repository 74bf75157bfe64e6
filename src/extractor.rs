use crate::error::Result;
use crate::extract::field::build_row;
use crate::extract::plan::ExtractionPlan;
use crate::extract::stream::ElementStream;
use crate::types::Table;
use std::io::BufRead;

/// Streams one parent group out of the input document
pub struct XmlExtractor<'p> {
    plan: &'p ExtractionPlan,
}

impl<'p> XmlExtractor<'p> {
    pub fn new(plan: &'p ExtractionPlan) -> Self {
        XmlExtractor { plan }
    }

    /// Extract the group from the plan's input file
    pub fn extract(&self) -> Result<Table> {
        if self.plan.window().is_exhausted() {
            return Ok(Table::new(self.plan.header()));
        }
        let stream = ElementStream::from_path(&self.plan.input_file, self.plan.parent.clone())?;
        self.run(stream)
    }

    /// Extract the group from an already-open document
    pub fn extract_from_reader<R: BufRead>(&self, reader: R) -> Result<Table> {
        let stream = ElementStream::from_reader(
            reader,
            self.plan.parent.clone(),
            self.plan.input_file.display().to_string(),
        );
        self.run(stream)
    }

    fn run<R: BufRead>(&self, stream: ElementStream<R>) -> Result<Table> {
        let mut table = Table::new(self.plan.header());
        let mut window = self.plan.window();
        let mut matches = 0u64;

        if window.is_exhausted() {
            return Ok(table);
        }

        for fragment in stream {
            let fragment = fragment?;
            matches += 1;

            if window.should_skip() {
                log::trace!("skipping match #{}", matches);
                continue;
            }

            let row = build_row(&fragment, &self.plan.columns);
            let admitted = match &self.plan.filter {
                Some(filter) => filter.admit(&row),
                None => true,
            };
            if !admitted {
                log::trace!("match #{} rejected by filter", matches);
                continue;
            }

            table.rows.push(row);
            window.record_admission();
            if window.is_exhausted() {
                log::debug!("row limit reached after {} matches", matches);
                break;
            }
        }

        log::debug!(
            "group {:?}: {} matches, {} rows",
            self.plan.parent_expression,
            matches,
            table.rows.len()
        );
        Ok(table)
    }
}
