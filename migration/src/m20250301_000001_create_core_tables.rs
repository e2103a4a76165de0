use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_column<T: IntoIden>(iden: T) -> ColumnDef {
    ColumnDef::new(iden)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_column<T: IntoIden>(iden: T) -> ColumnDef {
    ColumnDef::new(iden).big_integer().not_null().to_owned()
}

// 账户直接归属的学校，学校删除后置空
fn profile_school_fk() -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name("fk_profiles_school_id")
        .from(Profiles::Table, Profiles::SchoolId)
        .to(Schools::Table, Schools::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // profiles 与 schools 互相引用。SQLite 允许建表时引用尚未创建的表，
        // 但不支持事后 ALTER 外键；其他数据库在 schools 建好后再补外键。
        let sqlite = manager.get_database_backend() == sea_orm::DbBackend::Sqlite;

        // 用户资料表（登录账号）
        let mut profiles = Table::create();
        profiles
            .table(Profiles::Table)
            .if_not_exists()
            .col(id_column(Profiles::Id))
            .col(
                ColumnDef::new(Profiles::Email)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Profiles::PasswordHash).string().not_null())
            .col(ColumnDef::new(Profiles::FullName).string().not_null())
            .col(ColumnDef::new(Profiles::UserType).string().not_null())
            .col(ColumnDef::new(Profiles::Status).string().not_null())
            .col(ColumnDef::new(Profiles::SchoolId).big_integer().null())
            .col(ColumnDef::new(Profiles::AvatarUrl).string().null())
            .col(ColumnDef::new(Profiles::LastLogin).big_integer().null())
            .col(timestamp_column(Profiles::CreatedAt))
            .col(timestamp_column(Profiles::UpdatedAt));
        if sqlite {
            profiles.foreign_key(&mut profile_school_fk());
        }
        manager.create_table(profiles).await?;

        // 学校表
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(id_column(Schools::Id))
                    .col(
                        ColumnDef::new(Schools::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Schools::Cnpj).string().null().unique_key())
                    .col(ColumnDef::new(Schools::Email).string().null())
                    .col(ColumnDef::new(Schools::Phone).string().null())
                    .col(ColumnDef::new(Schools::Address).string().null())
                    .col(ColumnDef::new(Schools::City).string().null())
                    .col(ColumnDef::new(Schools::State).string().null())
                    .col(ColumnDef::new(Schools::LogoUrl).string().null())
                    .col(ColumnDef::new(Schools::DirectorId).big_integer().null())
                    .col(ColumnDef::new(Schools::OwnerId).big_integer().null())
                    .col(
                        ColumnDef::new(Schools::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp_column(Schools::CreatedAt))
                    .col(timestamp_column(Schools::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Schools::Table, Schools::DirectorId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Schools::Table, Schools::OwnerId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        if !sqlite {
            manager.create_foreign_key(profile_school_fk()).await?;
        }

        // 课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(id_column(Courses::Id))
                    .col(ColumnDef::new(Courses::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().null())
                    .col(timestamp_column(Courses::CreatedAt))
                    .col(timestamp_column(Courses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 学科表
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(id_column(Subjects::Id))
                    .col(ColumnDef::new(Subjects::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Subjects::CourseId).big_integer().null())
                    .col(ColumnDef::new(Subjects::Name).string().not_null())
                    .col(ColumnDef::new(Subjects::WorkloadHours).integer().null())
                    .col(timestamp_column(Subjects::CreatedAt))
                    .col(timestamp_column(Subjects::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Subjects::Table, Subjects::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Subjects::Table, Subjects::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 班级表
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(id_column(Classes::Id))
                    .col(ColumnDef::new(Classes::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Classes::CourseId).big_integer().null())
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(ColumnDef::new(Classes::SchoolYear).integer().not_null())
                    .col(ColumnDef::new(Classes::Shift).string().not_null())
                    .col(timestamp_column(Classes::CreatedAt))
                    .col(timestamp_column(Classes::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Classes::Table, Classes::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Classes::Table, Classes::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 教师表
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(id_column(Teachers::Id))
                    .col(ColumnDef::new(Teachers::SchoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Teachers::ProfileId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Teachers::FullName).string().not_null())
                    .col(ColumnDef::new(Teachers::Email).string().not_null())
                    .col(ColumnDef::new(Teachers::Phone).string().null())
                    .col(ColumnDef::new(Teachers::Specialization).string().null())
                    .col(timestamp_column(Teachers::CreatedAt))
                    .col(timestamp_column(Teachers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teachers::Table, Teachers::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teachers::Table, Teachers::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 监护人表
        manager
            .create_table(
                Table::create()
                    .table(Guardians::Table)
                    .if_not_exists()
                    .col(id_column(Guardians::Id))
                    .col(ColumnDef::new(Guardians::SchoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Guardians::ProfileId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Guardians::FullName).string().not_null())
                    .col(ColumnDef::new(Guardians::Email).string().not_null())
                    .col(ColumnDef::new(Guardians::Phone).string().null())
                    .col(timestamp_column(Guardians::CreatedAt))
                    .col(timestamp_column(Guardians::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Guardians::Table, Guardians::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Guardians::Table, Guardians::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 头像表（学生表引用，需先创建）
        manager
            .create_table(
                Table::create()
                    .table(Avatars::Table)
                    .if_not_exists()
                    .col(id_column(Avatars::Id))
                    .col(
                        ColumnDef::new(Avatars::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Avatars::ImageUrl).string().not_null())
                    .col(
                        ColumnDef::new(Avatars::RequiredXp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Avatars::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp_column(Avatars::CreatedAt))
                    .col(timestamp_column(Avatars::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // 学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(id_column(Students::Id))
                    .col(ColumnDef::new(Students::SchoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Students::ProfileId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::ClassId).big_integer().null())
                    .col(ColumnDef::new(Students::GuardianId).big_integer().null())
                    .col(ColumnDef::new(Students::FullName).string().not_null())
                    .col(ColumnDef::new(Students::Registration).string().not_null())
                    .col(ColumnDef::new(Students::BirthDate).string().null())
                    .col(
                        ColumnDef::new(Students::Xp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Students::Atoms)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Students::AvatarId).big_integer().null())
                    .col(timestamp_column(Students::CreatedAt))
                    .col(timestamp_column(Students::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::GuardianId)
                            .to(Guardians::Table, Guardians::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::AvatarId)
                            .to(Avatars::Table, Avatars::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 教师-班级-学科关联表
        manager
            .create_table(
                Table::create()
                    .table(TeacherClassSubjects::Table)
                    .if_not_exists()
                    .col(id_column(TeacherClassSubjects::Id))
                    .col(
                        ColumnDef::new(TeacherClassSubjects::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherClassSubjects::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherClassSubjects::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherClassSubjects::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(timestamp_column(TeacherClassSubjects::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherClassSubjects::Table, TeacherClassSubjects::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherClassSubjects::Table, TeacherClassSubjects::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherClassSubjects::Table, TeacherClassSubjects::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherClassSubjects::Table, TeacherClassSubjects::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 文件表
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::OriginalName).string().not_null())
                    .col(ColumnDef::new(Files::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Files::FileType).string().not_null())
                    .col(ColumnDef::new(Files::UploadedBy).big_integer().not_null())
                    .col(timestamp_column(Files::UploadedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::UploadedBy)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一约束
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_courses_school_name")
                    .table(Courses::Table)
                    .col(Courses::SchoolId)
                    .col(Courses::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_subjects_school_name")
                    .table(Subjects::Table)
                    .col(Subjects::SchoolId)
                    .col(Subjects::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_classes_school_name_year")
                    .table(Classes::Table)
                    .col(Classes::SchoolId)
                    .col(Classes::Name)
                    .col(Classes::SchoolYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_students_school_registration")
                    .table(Students::Table)
                    .col(Students::SchoolId)
                    .col(Students::Registration)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_teacher_class_subject")
                    .table(TeacherClassSubjects::Table)
                    .col(TeacherClassSubjects::TeacherId)
                    .col(TeacherClassSubjects::ClassId)
                    .col(TeacherClassSubjects::SubjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 普通索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_profiles_school_id")
                    .table(Profiles::Table)
                    .col(Profiles::SchoolId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_schools_director_id")
                    .table(Schools::Table)
                    .col(Schools::DirectorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_schools_owner_id")
                    .table(Schools::Table)
                    .col(Schools::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_students_class_id")
                    .table(Students::Table)
                    .col(Students::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_students_guardian_id")
                    .table(Students::Table)
                    .col(Students::GuardianId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeacherClassSubjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Avatars::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Guardians::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        if manager.get_database_backend() != sea_orm::DbBackend::Sqlite {
            manager
                .drop_foreign_key(
                    ForeignKey::drop()
                        .name("fk_profiles_school_id")
                        .table(Profiles::Table)
                        .to_owned(),
                )
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Profiles {
    #[sea_orm(iden = "profiles")]
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    UserType,
    Status,
    SchoolId,
    AvatarUrl,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schools {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
    Name,
    Cnpj,
    Email,
    Phone,
    Address,
    City,
    State,
    LogoUrl,
    DirectorId,
    OwnerId,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    SchoolId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subjects {
    #[sea_orm(iden = "subjects")]
    Table,
    Id,
    SchoolId,
    CourseId,
    Name,
    WorkloadHours,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
    SchoolId,
    CourseId,
    Name,
    SchoolYear,
    Shift,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teachers {
    #[sea_orm(iden = "teachers")]
    Table,
    Id,
    SchoolId,
    ProfileId,
    FullName,
    Email,
    Phone,
    Specialization,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Guardians {
    #[sea_orm(iden = "guardians")]
    Table,
    Id,
    SchoolId,
    ProfileId,
    FullName,
    Email,
    Phone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Avatars {
    #[sea_orm(iden = "avatars")]
    Table,
    Id,
    Name,
    ImageUrl,
    RequiredXp,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    SchoolId,
    ProfileId,
    ClassId,
    GuardianId,
    FullName,
    Registration,
    BirthDate,
    Xp,
    Atoms,
    AvatarId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeacherClassSubjects {
    #[sea_orm(iden = "teacher_class_subjects")]
    Table,
    Id,
    SchoolId,
    TeacherId,
    ClassId,
    SubjectId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Files {
    #[sea_orm(iden = "files")]
    Table,
    Token,
    OriginalName,
    FileSize,
    FileType,
    UploadedBy,
    UploadedAt,
}
