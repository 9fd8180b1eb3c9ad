//! Publish contract tests against the in-memory server.
//!
//! Any conforming `PlanServer` must behave the same way: create on first
//! publish, full replace afterwards, idempotent republish, and no server
//! contact for invalid plans.

use planspec_core::model::{
    Artifact, Job, Key, Oid, Plan, ProjectRef, Stage, Task, TaskKind, TestType,
};
use planspec_core::{
    catalog, publish_plan, MemoryPlanServer, PlanServer, PublishError, PublishOutcome,
    ValidationError,
};

fn scenario_plan(tasks: Vec<Task>) -> Plan {
    let job = Job::new("Build and test", Key::new("JOB1").unwrap())
        .with_tasks(tasks)
        .with_artifacts(vec![Artifact::new("zulu", "build/zulu")]);

    Plan::new(
        ProjectRef::new(Key::new("PLAYG").unwrap()),
        Key::new("DMIBSTB").unwrap(),
        Oid::new("1jwrvrqpgcf7y").unwrap(),
        "Scenario plan",
    )
    .with_stages(vec![Stage::new("Build and test", vec![job])])
}

fn scenario_tasks() -> Vec<Task> {
    vec![
        Task::checkout_default(true),
        Task::script_file("build.sh"),
        Task::test_parser(TestType::Junit, "**/*.xml"),
    ]
}

#[tokio::test]
async fn scenario_single_job_plan_round_trips_through_server() {
    let server = MemoryPlanServer::new();
    let plan = scenario_plan(scenario_tasks());

    assert_eq!(plan.stages.len(), 1);
    assert_eq!(plan.stages[0].jobs.len(), 1);
    assert_eq!(plan.stages[0].jobs[0].tasks.len(), 3);
    assert_eq!(plan.stages[0].jobs[0].artifacts.len(), 1);

    let receipt = publish_plan(&server, plan.clone()).await.unwrap();
    assert_eq!(receipt.outcome, PublishOutcome::Created);
    assert_eq!(receipt.identity.plan_key.as_str(), "DMIBSTB");

    let stored = server.fetch(&receipt.identity).await.unwrap().unwrap();
    assert_eq!(stored.plan.identity(), plan.identity());
    assert_eq!(stored.plan.stages[0].jobs[0].tasks, plan.stages[0].jobs[0].tasks);
    assert_eq!(stored.digest, receipt.digest);
}

#[test]
fn building_twice_yields_equal_trees() {
    assert_eq!(
        scenario_plan(scenario_tasks()),
        scenario_plan(scenario_tasks())
    );
    assert_eq!(
        catalog::barcoding::plan().unwrap(),
        catalog::barcoding::plan().unwrap()
    );
}

#[tokio::test]
async fn republishing_same_plan_is_idempotent() {
    let server = MemoryPlanServer::new();
    let plan = catalog::bam2fastx::plan().unwrap();
    let identity = plan.identity();

    publish_plan(&server, plan.clone()).await.unwrap();
    let after_first = server.fetch(&identity).await.unwrap().unwrap();

    let second = publish_plan(&server, plan).await.unwrap();
    let after_second = server.fetch(&identity).await.unwrap().unwrap();

    assert_eq!(second.outcome, PublishOutcome::Updated);
    assert_eq!(after_first.plan, after_second.plan);
    assert_eq!(after_first.digest, after_second.digest);
    assert_eq!(server.len(), 1);
}

#[tokio::test]
async fn republishing_replaces_definition_wholesale() {
    let server = MemoryPlanServer::new();
    let mut plan = catalog::barcoding::plan().unwrap();
    publish_plan(&server, plan.clone()).await.unwrap();

    plan.triggers.clear();
    plan.branch_management = None;
    plan.stages[0].jobs[0].tasks.truncate(1);
    publish_plan(&server, plan.clone()).await.unwrap();

    let stored = server.fetch(&plan.identity()).await.unwrap().unwrap();
    assert!(stored.plan.triggers.is_empty());
    assert!(stored.plan.branch_management.is_none());
    assert_eq!(stored.plan.stages[0].jobs[0].tasks.len(), 1);
}

#[tokio::test]
async fn task_order_is_what_the_server_sees() {
    let server = MemoryPlanServer::new();
    let mut reordered = scenario_tasks();
    reordered.swap(1, 2);

    let receipt = publish_plan(&server, scenario_plan(reordered)).await.unwrap();
    let stored = server.fetch(&receipt.identity).await.unwrap().unwrap();
    let tasks = &stored.plan.stages[0].jobs[0].tasks;

    assert!(matches!(tasks[0].kind, TaskKind::Checkout { .. }));
    assert!(matches!(tasks[1].kind, TaskKind::TestParser { .. }));
    assert!(matches!(tasks[2].kind, TaskKind::Script { .. }));
}

#[tokio::test]
async fn plan_without_stages_never_reaches_server() {
    let server = MemoryPlanServer::new();
    let plan = scenario_plan(scenario_tasks()).with_stages(vec![]);

    let err = publish_plan(&server, plan).await.unwrap_err();
    assert!(matches!(
        err,
        PublishError::Validation(ValidationError::NoStages)
    ));
    assert!(server.is_empty());
}

#[tokio::test]
async fn stage_without_jobs_never_reaches_server() {
    let server = MemoryPlanServer::new();
    let plan = scenario_plan(scenario_tasks())
        .with_stages(vec![Stage::new("Empty", vec![])]);

    let err = publish_plan(&server, plan).await.unwrap_err();
    assert!(matches!(
        err,
        PublishError::Validation(ValidationError::EmptyStage { .. })
    ));
    assert!(server.is_empty());
}

#[tokio::test]
async fn duplicate_artifact_never_reaches_server() {
    let server = MemoryPlanServer::new();
    let mut plan = scenario_plan(scenario_tasks());
    plan.stages[0].jobs[0]
        .artifacts
        .push(Artifact::new("zulu", "build/other"));

    let err = publish_plan(&server, plan).await.unwrap_err();
    assert!(matches!(
        err,
        PublishError::Validation(ValidationError::DuplicateArtifact { .. })
    ));
    assert!(server.is_empty());
}

#[tokio::test]
async fn catalog_plans_coexist_on_one_server() {
    let server = MemoryPlanServer::new();
    for name in catalog::names() {
        let plan = catalog::lookup(name).unwrap().unwrap();
        let receipt = publish_plan(&server, plan).await.unwrap();
        assert_eq!(receipt.outcome, PublishOutcome::Created);
    }
    assert_eq!(server.len(), 2);
}
