//! Deterministic plans used when the model gives us nothing usable

use super::keywords::KeywordSet;
use super::types::TaskItem;
use crate::config::FallbackConfig;

struct TaskTemplate {
    step: &'static str,
    task: &'static str,
    description: &'static str,
    technologies: &'static [&'static str],
    deliverables: &'static [&'static str],
    estimated_time: &'static str,
}

impl TaskTemplate {
    fn to_task(&self) -> TaskItem {
        TaskItem {
            step: self.step.to_string(),
            task: self.task.to_string(),
            description: self.description.to_string(),
            technologies: self.technologies.iter().map(|s| s.to_string()).collect(),
            deliverables: self.deliverables.iter().map(|s| s.to_string()).collect(),
            estimated_time: self.estimated_time.to_string(),
            jira_issue: None,
            jira_link: None,
            github_issue: None,
            github_link: None,
        }
    }
}

const MOBILE_PLAN: &[TaskTemplate] = &[
    TaskTemplate {
        step: "Requirements Analysis",
        task: "Define Functional and Non-Functional Requirements",
        description: "Conduct stakeholder interviews, create user stories, define MVP features, and document technical requirements. Create a comprehensive requirements document including user personas, use cases, and acceptance criteria.",
        technologies: &["Figma", "Jira", "Confluence", "User Story Mapping Tools"],
        deliverables: &["Requirements Document", "User Stories", "MVP Feature List", "Technical Specifications"],
        estimated_time: "1-2 weeks",
    },
    TaskTemplate {
        step: "Technical Architecture",
        task: "Design System Architecture and Technology Stack",
        description: "Design the overall system architecture, choose technology stack, plan database schema, and define API structure. Consider scalability, security, and maintainability requirements.",
        technologies: &["React Native/Flutter", "Node.js/Python", "PostgreSQL/MongoDB", "AWS/Firebase", "REST/GraphQL"],
        deliverables: &["Architecture Diagram", "Technology Stack Document", "Database Schema", "API Documentation"],
        estimated_time: "1-2 weeks",
    },
    TaskTemplate {
        step: "UI/UX Design",
        task: "Create User Interface and Experience Design",
        description: "Design wireframes, create high-fidelity mockups, develop design system, and create interactive prototypes. Ensure responsive design and accessibility compliance.",
        technologies: &["Figma", "Adobe XD", "Sketch", "InVision", "Design System Tools"],
        deliverables: &["Wireframes", "High-fidelity Mockups", "Design System", "Interactive Prototype"],
        estimated_time: "2-3 weeks",
    },
    TaskTemplate {
        step: "Backend Development",
        task: "Develop Server-Side Logic and APIs",
        description: "Set up development environment, implement authentication, create REST/GraphQL APIs, integrate with third-party services, and implement business logic with proper error handling and security measures.",
        technologies: &["Node.js/Express", "Python/Django", "JWT", "Stripe/PayPal APIs", "AWS S3", "Redis"],
        deliverables: &["API Endpoints", "Authentication System", "Database Models", "Third-party Integrations"],
        estimated_time: "4-6 weeks",
    },
    TaskTemplate {
        step: "Frontend Development",
        task: "Build Mobile Application Interface",
        description: "Implement UI components, integrate with backend APIs, implement navigation, add state management, and ensure cross-platform compatibility with native features integration.",
        technologies: &["React Native", "Flutter", "Redux/MobX", "Native Modules", "Push Notifications"],
        deliverables: &["Mobile App Components", "API Integration", "Navigation System", "State Management"],
        estimated_time: "4-6 weeks",
    },
    TaskTemplate {
        step: "Testing & Quality Assurance",
        task: "Comprehensive Testing and Bug Fixing",
        description: "Implement unit tests, integration tests, perform manual testing on multiple devices, conduct security testing, and optimize performance. Include accessibility testing and user acceptance testing.",
        technologies: &["Jest", "Detox", "Appium", "Firebase Test Lab", "Security Testing Tools"],
        deliverables: &["Test Suites", "Test Reports", "Performance Metrics", "Bug Fix Documentation"],
        estimated_time: "2-3 weeks",
    },
    TaskTemplate {
        step: "Deployment & Launch",
        task: "Deploy to App Stores and Production",
        description: "Set up CI/CD pipeline, prepare app store listings, deploy backend to production servers, submit apps for review, and configure monitoring and analytics systems.",
        technologies: &["GitHub Actions", "App Store Connect", "Google Play Console", "AWS/Heroku", "Analytics Tools"],
        deliverables: &["Published Apps", "Production Environment", "CI/CD Pipeline", "Monitoring Dashboard"],
        estimated_time: "1-2 weeks",
    },
];

const GENERIC_PLAN: &[TaskTemplate] = &[
    TaskTemplate {
        step: "Project Planning",
        task: "Define Project Scope and Requirements",
        description: "Analyze project requirements, define scope, create user stories, establish project timeline, and document requirements.",
        technologies: &["Project Management Tools", "Documentation Platforms", "Requirement Analysis Tools"],
        deliverables: &["Project Scope Document", "User Stories", "Timeline", "Requirements Specification"],
        estimated_time: "1-2 weeks",
    },
    TaskTemplate {
        step: "System Design",
        task: "Create Technical Architecture and Design",
        description: "Design the system architecture, choose appropriate technology stack, create database schema, and plan API structure. Consider scalability, security, and performance requirements.",
        technologies: &["System Design Tools", "Database Design Tools", "API Documentation Tools"],
        deliverables: &["Architecture Diagram", "Database Schema", "API Design", "Technology Stack Selection"],
        estimated_time: "1-2 weeks",
    },
    TaskTemplate {
        step: "Development Setup",
        task: "Set Up Development Environment and Infrastructure",
        description: "Set up development environment, configure version control, establish coding standards, and prepare deployment infrastructure. Include security configurations and monitoring setup.",
        technologies: &["Git", "Docker", "CI/CD Tools", "Cloud Platforms", "Development IDEs"],
        deliverables: &["Development Environment", "Git Repository", "Deployment Pipeline", "Coding Standards Document"],
        estimated_time: "3-5 days",
    },
    TaskTemplate {
        step: "Core Development",
        task: "Implement Core Functionality",
        description: "Develop the main features and functionality of the application. Implement business logic, user authentication, data management, and core user workflows with proper error handling.",
        technologies: &["Programming Languages", "Frameworks", "Databases", "Authentication Systems"],
        deliverables: &["Core Application Features", "Authentication System", "Database Implementation", "API Endpoints"],
        estimated_time: "4-8 weeks",
    },
    TaskTemplate {
        step: "Testing & QA",
        task: "Test and Validate the System",
        description: "Perform comprehensive testing including unit tests, integration tests, performance testing, and security testing. Conduct user acceptance testing and fix identified issues.",
        technologies: &["Testing Frameworks", "Automated Testing Tools", "Performance Testing Tools", "Security Testing Tools"],
        deliverables: &["Test Suites", "Test Reports", "Performance Metrics", "Security Assessment"],
        estimated_time: "2-3 weeks",
    },
    TaskTemplate {
        step: "Deployment",
        task: "Deploy to Production Environment",
        description: "Deploy the application to production servers, configure monitoring and logging, set up backup systems, and ensure high availability. Include performance optimization and security hardening.",
        technologies: &["Cloud Platforms", "Monitoring Tools", "Backup Solutions", "Security Tools"],
        deliverables: &["Production Deployment", "Monitoring Dashboard", "Backup System", "Security Configuration"],
        estimated_time: "1-2 weeks",
    },
];

/// Which fixed template a goal maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Mobile,
    Generic,
}

/// Picks one of the fixed plans from keyword signals in the goal
#[derive(Debug, Clone)]
pub struct FallbackPlanner {
    mobile_keywords: KeywordSet,
}

impl Default for FallbackPlanner {
    fn default() -> Self {
        Self::from_config(&FallbackConfig::default())
    }
}

impl FallbackPlanner {
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            mobile_keywords: KeywordSet::new(&config.mobile_keywords),
        }
    }

    pub fn classify(&self, goal: &str) -> FallbackKind {
        if self.mobile_keywords.matches(goal) {
            FallbackKind::Mobile
        } else {
            FallbackKind::Generic
        }
    }

    /// Always non-empty; same goal class, same tasks
    pub fn plan(&self, goal: &str) -> Vec<TaskItem> {
        let template = match self.classify(goal) {
            FallbackKind::Mobile => MOBILE_PLAN,
            FallbackKind::Generic => GENERIC_PLAN,
        };
        template.iter().map(TaskTemplate::to_task).collect()
    }
}
