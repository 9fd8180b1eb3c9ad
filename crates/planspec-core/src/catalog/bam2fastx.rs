//! bam2fastx: build, test and analyze the BAM to FASTA/FASTQ converters.

use crate::error::Result;
use crate::model::{
    Artifact, BranchManagement, Job, Key, NotificationPolicy, Oid, Plan, Requirement, Stage,
    Task, TestType, Trigger,
};

use super::{playground_project, redhat_host, sonar_scan, SonarProject};

pub fn plan() -> Result<Plan> {
    let job = Job::new("Build", Key::new("JOB1")?)
        .with_artifacts(vec![
            Artifact::new("bam2fastq", "build/bam2fastq"),
            Artifact::new("bam2fasta", "build/bam2fasta"),
        ])
        .with_tasks(vec![
            Task::checkout_default(true).with_description("Checkout Default Repository"),
            Task::script_file("bamboo_scripts/build_scripts/bam2fastx_build.sh")
                .with_description("Build"),
            Task::test_parser(TestType::Junit, "build/*.xml"),
            sonar_scan(SonarProject {
                name: "SAT-bam2fastx",
                sources: "src",
                version: "1.1.1",
            })
            .with_description("runs static analysis for bam2fastx without any code coverage")
            .disabled(),
        ])
        .with_requirements(vec![
            redhat_host(),
            Requirement::equals("system.os", "linux"),
        ]);

    Ok(Plan::new(
        playground_project()?,
        Key::new("DMBIBSTB")?,
        Oid::new("1jwrvrqpgcf7x")?,
        "DEP-bam2fastx Bamboo Spec",
    )
    .disabled()
    .with_stages(vec![Stage::new("Default Stage", vec![job])])
    .with_linked_repository("bam2fastx")
    .with_triggers(vec![
        Trigger::repository_push("Bitbucket Server repository triggered"),
        Trigger::daily("Single daily build", "00:00")
            .with_config("trigger.created.by.user", "mhsieh")
            .disabled(),
    ])
    .with_branch_management(
        BranchManagement::for_pull_requests()
            .delete_after(7, 30)
            .notify(NotificationPolicy::ForCommitters),
    ))
}
