//! barcoding: build and test with the build script kept in the repository.

use crate::error::Result;
use crate::model::{
    Artifact, BranchManagement, Job, Key, NotificationPolicy, Oid, Plan, Stage, Task, TestType,
    Trigger,
};

use super::{playground_project, redhat_host, sonar_scan, SonarProject};

pub fn plan() -> Result<Plan> {
    let job = Job::new("Build and test", Key::new("JOB1")?)
        .with_artifacts(vec![
            Artifact::new("zulu", "zulu").at("build"),
            Artifact::new("lima", "lima").at("build"),
        ])
        .with_tasks(vec![
            Task::checkout_default(true).with_description("Checkout"),
            Task::script_file("bamboo_scripts/build_scripts/barcoding_build.sh")
                .with_description("Build Script"),
            Task::test_parser(TestType::Junit, "**/cram.xml").with_description("Tests"),
            sonar_scan(SonarProject {
                name: "SAT-barcoding",
                sources: "src,include",
                version: "0.1.2",
            })
            .with_description("runs static analysis for barcoding without any code coverage"),
        ])
        .with_requirements(vec![redhat_host()]);

    Ok(Plan::new(
        playground_project()?,
        Key::new("DMIBSTB")?,
        Oid::new("1jwrvrqpgcf7y")?,
        "DEP-801barcoding - move inline build script to bitbucket",
    )
    .disabled()
    .with_stages(vec![Stage::new("Build and test", vec![job])])
    .with_linked_repository("barcoding")
    .with_triggers(vec![
        Trigger::repository_push("Bitbucket Server repository triggered"),
        Trigger::remote("Remote trigger"),
        Trigger::daily("Single daily build", "00:00")
            .with_config("trigger.created.by.user", "mhsieh")
            .disabled(),
    ])
    .with_branch_management(
        BranchManagement::for_pull_requests()
            .delete_after(7, 30)
            .notify(NotificationPolicy::LikeParentPlan),
    ))
}
