//! Runs compiled statement plans inside an open store transaction.

use log::debug;

use super::results::normalize_value;
use crate::cypher_generator::{ElementRef, GraphQuery, MatchQuery};
use crate::statement_compiler::plan::{
    Endpoint, Link, Mutation, PlanStep, Selection, StatementPlan, SELECTED_ID_COLUMN,
};
use crate::statement_compiler::SemanticError;
use crate::store::errors::StoreError;
use crate::store::value::{ElementId, Row, Value};
use crate::store::GraphTransaction;

#[derive(Debug)]
pub(crate) enum StepError {
    Semantic(SemanticError),
    Store(StoreError),
}

impl From<SemanticError> for StepError {
    fn from(err: SemanticError) -> Self {
        StepError::Semantic(err)
    }
}

impl From<StoreError> for StepError {
    fn from(err: StoreError) -> Self {
        StepError::Store(err)
    }
}

/// What running a plan produced, before it is shaped into a result.
#[derive(Debug, Default)]
pub(crate) struct PlanOutput {
    pub created: Option<ElementId>,
    pub affected: u64,
    pub rows: Vec<Row>,
}

pub(crate) struct PlanExecutor<'t> {
    tx: &'t mut dyn GraphTransaction,
}

impl<'t> PlanExecutor<'t> {
    pub fn new(tx: &'t mut dyn GraphTransaction) -> Self {
        PlanExecutor { tx }
    }

    async fn run(&mut self, query: &GraphQuery) -> Result<Vec<Row>, StoreError> {
        debug!("Running {:?}", query);
        self.tx.run(query).await
    }

    pub async fn execute(&mut self, plan: &StatementPlan) -> Result<PlanOutput, StepError> {
        let mut output = PlanOutput::default();
        for step in &plan.steps {
            match step {
                PlanStep::Ensure(query) => {
                    self.run(query).await?;
                }
                PlanStep::Verify(verification) => {
                    let rows = self
                        .run(&GraphQuery::LookupVertex {
                            id: verification.id,
                        })
                        .await?;
                    verification.check(rows.first())?;
                }
                PlanStep::Create(query) => {
                    let rows = self.run(query).await?;
                    output.created = Some(returned_id(&rows)?);
                }
                PlanStep::Link(link) => self.link(link, output.created).await?,
                PlanStep::Mutate {
                    selection,
                    mutation,
                } => output.affected += self.mutate(selection, mutation).await?,
                PlanStep::Query(query) => {
                    let rows = self.run(&GraphQuery::Match(query.clone())).await?;
                    output
                        .rows
                        .extend(rows.into_iter().map(|row| row.map_values(normalize_value)));
                }
            }
        }
        Ok(output)
    }

    async fn link(&mut self, link: &Link, created: Option<ElementId>) -> Result<(), StepError> {
        let resolve = |endpoint: Endpoint| match endpoint {
            Endpoint::Known(id) => Ok(id),
            Endpoint::Created => {
                created.ok_or_else(|| StoreError::query("no vertex was created for this edge"))
            }
        };
        let source = resolve(link.source)?;
        let target = resolve(link.target)?;
        self.create_edge(source, target, &link.label, link.properties.clone())
            .await
    }

    async fn create_edge(
        &mut self,
        source: ElementId,
        target: ElementId,
        label: &str,
        properties: Vec<(String, Value)>,
    ) -> Result<(), StepError> {
        let rows = self
            .run(&GraphQuery::CreateEdge {
                source,
                target,
                label: label.to_string(),
                properties,
            })
            .await?;
        if rows.is_empty() {
            return Err(SemanticError::MissingEndpoint {
                label: label.to_string(),
                source_id: source,
                target_id: target,
            }
            .into());
        }
        Ok(())
    }

    async fn select(&mut self, query: &MatchQuery) -> Result<Vec<ElementId>, StepError> {
        let rows = self.run(&GraphQuery::Match(query.clone())).await?;
        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row
                .get(SELECTED_ID_COLUMN)
                .and_then(Value::as_int)
                .ok_or_else(|| StoreError::Decode("selection row without an id".to_string()))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Applies `mutation` to every selected element and returns how many
    /// elements existed.
    async fn mutate(&mut self, selection: &Selection, mutation: &Mutation) -> Result<u64, StepError> {
        let elements: Vec<ElementRef> = match selection {
            Selection::Element(element) => vec![*element],
            Selection::AnyElement(id) => {
                if self.apply(ElementRef::Vertex(*id), mutation).await? {
                    return Ok(1);
                }
                vec![ElementRef::Edge(*id)]
            }
            Selection::Vertices(query) => self
                .select(query)
                .await?
                .into_iter()
                .map(ElementRef::Vertex)
                .collect(),
            Selection::Edges(query) => self
                .select(query)
                .await?
                .into_iter()
                .map(ElementRef::Edge)
                .collect(),
        };

        let mut affected = 0;
        for element in elements {
            if self.apply(element, mutation).await? {
                affected += 1;
            }
        }
        Ok(affected)
    }

    /// False when the element does not exist.
    async fn apply(&mut self, element: ElementRef, mutation: &Mutation) -> Result<bool, StepError> {
        let rows = self.run(&mutation.query_for(element)).await?;
        if rows.is_empty() {
            return Ok(false);
        }
        if let (Mutation::Set { references, .. }, ElementRef::Vertex(source)) = (mutation, element) {
            for reference in references {
                self.run(&GraphQuery::DeleteOutgoing {
                    source,
                    label: reference.label.clone(),
                })
                .await?;
                for target in &reference.targets {
                    self.create_edge(source, *target, &reference.label, Vec::new())
                        .await?;
                }
            }
        }
        Ok(true)
    }
}

fn returned_id(rows: &[Row]) -> Result<ElementId, StoreError> {
    rows.first()
        .and_then(|row| row.get("id"))
        .and_then(Value::as_int)
        .ok_or_else(|| StoreError::Decode("create returned no id".to_string()))
}
