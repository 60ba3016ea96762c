use std::error::Error;

use serde::Serialize;

use super::ClassifyCmd;
use crate::commands::{Context, Execute};
use crate::engine::QueryClassifier;
use crate::types::{Cardinality, DataAccessMethod, Query};

#[derive(Debug, Serialize)]
pub struct ClassifyResult {
    pub cardinality: Cardinality,
    #[serde(flatten)]
    pub method: DataAccessMethod,
}

impl Execute for ClassifyCmd {
    type Output = ClassifyResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let query = Query::new(self.name, self.sql).with_cardinality(self.cmd);
        let method = QueryClassifier::new(ctx.config.sql.clone()).classify(&query)?;

        Ok(ClassifyResult {
            cardinality: query.cardinality,
            method,
        })
    }
}
