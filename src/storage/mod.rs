//! 存储抽象
//!
//! 每个业务域一个异步 trait，`Storage` 把它们组合成一个可以放进
//! `Arc<dyn Storage>` 的整体。需要多行写入的操作由实现方放在同一事务内完成，
//! 业务规则不满足时返回内层的 `Rejection`。

use crate::errors::Result;
use crate::models::{
    Rejection,
    assignments::{
        entities::{Assignment, AssignmentDetail},
        requests::CreateAssignmentRequest,
    },
    avatars::{
        entities::Avatar,
        requests::{CreateAvatarRequest, UpdateAvatarRequest},
    },
    catalog::{
        entities::{Class, Course, Subject},
        requests::{
            CatalogListQuery, CreateClassRequest, CreateCourseRequest, CreateSubjectRequest,
            UpdateClassRequest, UpdateCourseRequest, UpdateSubjectRequest,
        },
        responses::{ClassListResponse, CourseListResponse, SubjectListResponse},
    },
    dashboard::responses::{AdminDashboard, LeaderboardEntry, SchoolDashboard},
    files::entities::File,
    gamification::{
        entities::{EconomyConfig, XpRule},
        requests::{CreateXpRuleRequest, UpdateEconomyRequest, UpdateXpRuleRequest},
        responses::{AtomBalanceResponse, AtomTransactionListResponse, XpAwardResponse},
    },
    people::{
        entities::{Guardian, NewLogin, Student, Teacher},
        requests::{
            CreateGuardianRequest, CreateStudentRequest, CreateTeacherRequest, PeopleListQuery,
            UpdateGuardianRequest, UpdateStudentRequest, UpdateTeacherRequest,
        },
        responses::{GuardianListResponse, StudentListResponse, TeacherListResponse},
    },
    profiles::{
        entities::{Profile, UserType},
        requests::{NewProfile, ProfileChanges, ProfileListQuery},
        responses::ProfileListResponse,
    },
    schools::{
        entities::School,
        requests::{CreateSchoolRequest, SchoolListQuery, UpdateSchoolRequest},
        responses::SchoolListResponse,
    },
    store::{
        entities::{OrderDetail, Product},
        requests::{
            CreateProductRequest, OrderLine, OrderListQuery, ProductListQuery,
            UpdateProductRequest,
        },
        responses::{OrderListResponse, ProductListResponse},
    },
};

pub mod sea_orm_storage;

/// 学校归属查询，供租户解析链使用
#[async_trait::async_trait]
pub trait SchoolLookup: Send + Sync {
    // 该账户担任校长的学校
    async fn school_id_by_director(&self, profile_id: i64) -> Result<Option<i64>>;
    // 该账户为所有者的学校
    async fn school_id_by_owner(&self, profile_id: i64) -> Result<Option<i64>>;
    // 账户自身的 school_id 字段
    async fn direct_school_id(&self, profile_id: i64) -> Result<Option<i64>>;
    // 按角色表（teachers / students / guardians）查询
    async fn school_id_by_role(&self, user_type: UserType, profile_id: i64)
    -> Result<Option<i64>>;
}

#[async_trait::async_trait]
pub trait ProfileStorage: Send + Sync {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile>;
    async fn get_profile_by_id(&self, id: i64) -> Result<Option<Profile>>;
    async fn get_profile_by_email(&self, email: &str) -> Result<Option<Profile>>;
    async fn list_profiles(&self, query: ProfileListQuery) -> Result<ProfileListResponse>;
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<Option<Profile>>;
    async fn delete_profile(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_profiles(&self) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait SchoolStorage: Send + Sync {
    // 同一事务内创建默认经济配置
    async fn create_school(&self, school: CreateSchoolRequest) -> Result<School>;
    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>>;
    async fn list_schools(&self, query: SchoolListQuery) -> Result<SchoolListResponse>;
    async fn update_school(&self, id: i64, update: UpdateSchoolRequest) -> Result<Option<School>>;
    /// 返回随学校删除的账户 id，学校不存在时为 None
    async fn delete_school(&self, id: i64) -> Result<Option<Vec<i64>>>;
}

#[async_trait::async_trait]
pub trait CatalogStorage: Send + Sync {
    async fn create_course(&self, school_id: i64, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses(&self, query: CatalogListQuery) -> Result<CourseListResponse>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest)
    -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;

    async fn create_subject(&self, school_id: i64, subject: CreateSubjectRequest)
    -> Result<Subject>;
    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>>;
    async fn list_subjects(&self, query: CatalogListQuery) -> Result<SubjectListResponse>;
    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, id: i64) -> Result<bool>;

    async fn create_class(&self, school_id: i64, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>>;
    async fn list_classes(&self, query: CatalogListQuery) -> Result<ClassListResponse>;
    async fn update_class(&self, id: i64, update: UpdateClassRequest) -> Result<Option<Class>>;
    async fn delete_class(&self, id: i64) -> Result<bool>;
}

/// 人员的创建会在同一事务内写入登录账户和人员行
#[async_trait::async_trait]
pub trait PeopleStorage: Send + Sync {
    async fn create_teacher(&self, login: NewLogin, req: CreateTeacherRequest) -> Result<Teacher>;
    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>>;
    async fn get_teacher_by_profile_id(&self, profile_id: i64) -> Result<Option<Teacher>>;
    async fn list_teachers(&self, query: PeopleListQuery) -> Result<TeacherListResponse>;
    async fn update_teacher(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>>;
    async fn delete_teacher(&self, id: i64) -> Result<bool>;

    async fn create_student(&self, login: NewLogin, req: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_profile_id(&self, profile_id: i64) -> Result<Option<Student>>;
    async fn list_students(&self, query: PeopleListQuery) -> Result<StudentListResponse>;
    async fn list_students_by_guardian(&self, guardian_id: i64) -> Result<Vec<Student>>;
    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    async fn delete_student(&self, id: i64) -> Result<bool>;

    async fn create_guardian(&self, login: NewLogin, req: CreateGuardianRequest)
    -> Result<Guardian>;
    async fn get_guardian_by_id(&self, id: i64) -> Result<Option<Guardian>>;
    async fn get_guardian_by_profile_id(&self, profile_id: i64) -> Result<Option<Guardian>>;
    async fn list_guardians(&self, query: PeopleListQuery) -> Result<GuardianListResponse>;
    async fn update_guardian(
        &self,
        id: i64,
        update: UpdateGuardianRequest,
    ) -> Result<Option<Guardian>>;
    async fn delete_guardian(&self, id: i64) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait AssignmentStorage: Send + Sync {
    async fn create_assignment(
        &self,
        school_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments(
        &self,
        school_id: Option<i64>,
        teacher_id: Option<i64>,
        class_id: Option<i64>,
    ) -> Result<Vec<AssignmentDetail>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait GamificationStorage: Send + Sync {
    async fn create_xp_rule(&self, school_id: i64, rule: CreateXpRuleRequest) -> Result<XpRule>;
    async fn get_xp_rule_by_id(&self, id: i64) -> Result<Option<XpRule>>;
    async fn list_xp_rules(&self, school_id: Option<i64>) -> Result<Vec<XpRule>>;
    async fn update_xp_rule(&self, id: i64, update: UpdateXpRuleRequest)
    -> Result<Option<XpRule>>;
    async fn delete_xp_rule(&self, id: i64) -> Result<bool>;

    async fn award_xp(
        &self,
        rule_id: i64,
        student_ids: &[i64],
        awarded_by: i64,
        note: Option<String>,
    ) -> Result<std::result::Result<XpAwardResponse, Rejection>>;

    // 不存在时返回默认配置
    async fn get_economy_config(&self, school_id: i64) -> Result<EconomyConfig>;
    async fn update_economy_config(
        &self,
        school_id: i64,
        update: UpdateEconomyRequest,
    ) -> Result<EconomyConfig>;

    async fn list_atom_transactions(
        &self,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<AtomTransactionListResponse>;
    async fn adjust_atoms(
        &self,
        student_id: i64,
        amount: i64,
        description: String,
        created_by: i64,
    ) -> Result<std::result::Result<AtomBalanceResponse, Rejection>>;
}

#[async_trait::async_trait]
pub trait StoreStorage: Send + Sync {
    async fn create_product(&self, school_id: i64, product: CreateProductRequest)
    -> Result<Product>;
    async fn get_product_by_id(&self, id: i64) -> Result<Option<Product>>;
    async fn list_products(&self, query: ProductListQuery) -> Result<ProductListResponse>;
    async fn update_product(
        &self,
        id: i64,
        update: UpdateProductRequest,
    ) -> Result<Option<Product>>;
    // 已有订单引用的商品拒绝删除
    async fn delete_product(&self, id: i64) -> Result<std::result::Result<bool, Rejection>>;

    async fn place_order(
        &self,
        student_id: i64,
        lines: &[OrderLine],
    ) -> Result<std::result::Result<OrderDetail, Rejection>>;
    async fn get_order_by_id(&self, id: i64) -> Result<Option<OrderDetail>>;
    async fn list_orders(&self, query: OrderListQuery) -> Result<OrderListResponse>;
    async fn deliver_order(
        &self,
        order_id: i64,
        delivered_by: i64,
        notes: Option<String>,
    ) -> Result<std::result::Result<OrderDetail, Rejection>>;
    async fn cancel_order(
        &self,
        order_id: i64,
        cancelled_by: i64,
    ) -> Result<std::result::Result<OrderDetail, Rejection>>;
}

#[async_trait::async_trait]
pub trait AvatarStorage: Send + Sync {
    async fn create_avatar(&self, avatar: CreateAvatarRequest) -> Result<Avatar>;
    async fn get_avatar_by_id(&self, id: i64) -> Result<Option<Avatar>>;
    async fn list_avatars(&self, include_inactive: bool) -> Result<Vec<Avatar>>;
    async fn update_avatar(&self, id: i64, update: UpdateAvatarRequest) -> Result<Option<Avatar>>;
    async fn delete_avatar(&self, id: i64) -> Result<bool>;
    async fn count_avatars(&self) -> Result<u64>;
    async fn equip_avatar(
        &self,
        student_id: i64,
        avatar_id: i64,
    ) -> Result<std::result::Result<Student, Rejection>>;
}

#[async_trait::async_trait]
pub trait DashboardStorage: Send + Sync {
    async fn admin_overview(&self) -> Result<AdminDashboard>;
    async fn school_overview(&self, school_id: i64) -> Result<SchoolDashboard>;
    // 按 XP 降序
    async fn leaderboard(
        &self,
        school_id: Option<i64>,
        class_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<LeaderboardEntry>>;
    async fn count_students_in_classes(&self, class_ids: &[i64]) -> Result<u64>;
    async fn count_pending_orders_of_student(&self, student_id: i64) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        uploaded_by: i64,
    ) -> Result<File>;
    async fn get_file_by_token(&self, token: &str) -> Result<Option<File>>;
}

#[async_trait::async_trait]
pub trait SystemStorage: Send + Sync {
    // 数据库连通性检查
    async fn ping(&self) -> Result<()>;
}

pub trait Storage:
    SchoolLookup
    + ProfileStorage
    + SchoolStorage
    + CatalogStorage
    + PeopleStorage
    + AssignmentStorage
    + GamificationStorage
    + StoreStorage
    + AvatarStorage
    + DashboardStorage
    + FileStorage
    + SystemStorage
    + Send
    + Sync
{
}

impl<T> Storage for T where
    T: SchoolLookup
        + ProfileStorage
        + SchoolStorage
        + CatalogStorage
        + PeopleStorage
        + AssignmentStorage
        + GamificationStorage
        + StoreStorage
        + AvatarStorage
        + DashboardStorage
        + FileStorage
        + SystemStorage
        + Send
        + Sync
        + ?Sized
{
}
